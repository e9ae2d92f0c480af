//! Command channel - the agent's only link to the simulator.
//!
//! Commands go out unacknowledged; a failed send is logged and forgotten so
//! the next tick can try again. Receives are bounded by a timeout and come
//! back empty rather than blocking the tick.

mod udp;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::command::{Command, Plan, Step};

pub use udp::UdpTransport;

/// Datagram-style transport.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: &str) -> Result<(), TransportError>;

    /// Wait up to `timeout` for one inbound message. `Ok(None)` on timeout.
    async fn recv(&mut self, timeout: Duration) -> Result<Option<String>, TransportError>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve server address `{0}`")]
    Resolve(String),

    #[error("failed to bind local socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),

    #[error("channel closed")]
    Closed,
}

/// Wraps a transport with the fire-and-forget send policy.
pub struct CommandChannel<T> {
    transport: T,
    sent: u64,
    failed_sends: u64,
}

impl<T: Transport> CommandChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sent: 0,
            failed_sends: 0,
        }
    }

    /// Send one command. Failures are swallowed.
    pub async fn send(&mut self, command: &Command) {
        let text = command.to_string();
        match self.transport.send(&text).await {
            Ok(()) => self.sent += 1,
            Err(e) => {
                self.failed_sends += 1;
                tracing::debug!(command = %text, error = %e, "Send failed");
            }
        }
    }

    /// Run a plan: sends in order, sleeping through the pauses.
    pub async fn execute(&mut self, plan: &Plan) {
        for step in plan.steps() {
            match step {
                Step::Send(command) => self.send(command).await,
                Step::Pause(d) => tokio::time::sleep(*d).await,
            }
        }
    }

    /// Receive one message, or an empty string on timeout.
    pub async fn recv(&mut self, timeout: Duration) -> Result<String, TransportError> {
        Ok(self.transport.recv(timeout).await?.unwrap_or_default())
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn failed_sends(&self) -> u64 {
        self.failed_sends
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
