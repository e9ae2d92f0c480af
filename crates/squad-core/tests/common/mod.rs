//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use squad_core::{ActionCode, DecisionProvider, Observation, PolicyError, Transport, TransportError};

/// What the scripted transport hands out on the next receive.
pub enum Inbound {
    Message(String),
    Closed,
}

/// In-memory transport: replays a script of inbound messages and records
/// every outbound one. An exhausted script behaves like a quiet server.
pub struct ScriptedTransport {
    inbound: VecDeque<Inbound>,
    outbound: Arc<Mutex<Vec<String>>>,
    fail_sends: bool,
}

impl ScriptedTransport {
    pub fn new(messages: &[&str]) -> (Self, Arc<Mutex<Vec<String>>>) {
        let outbound = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            inbound: messages
                .iter()
                .map(|m| Inbound::Message((*m).to_string()))
                .collect(),
            outbound: Arc::clone(&outbound),
            fail_sends: false,
        };
        (transport, outbound)
    }

    pub fn push(&mut self, inbound: Inbound) {
        self.inbound.push_back(inbound);
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Closed);
        }
        self.outbound.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn recv(&mut self, timeout: Duration) -> Result<Option<String>, TransportError> {
        match self.inbound.pop_front() {
            Some(Inbound::Message(m)) => Ok(Some(m)),
            Some(Inbound::Closed) => Err(TransportError::Closed),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}

/// Provider that answers with a fixed result and counts calls.
pub struct FixedProvider {
    pub answer: Result<ActionCode, i64>,
    pub calls: Arc<Mutex<usize>>,
}

impl FixedProvider {
    pub fn answering(action: ActionCode) -> (Self, Arc<Mutex<usize>>) {
        Self::with(Ok(action))
    }

    /// Answers with an out-of-range code.
    pub fn invalid(code: i64) -> (Self, Arc<Mutex<usize>>) {
        Self::with(Err(code))
    }

    fn with(answer: Result<ActionCode, i64>) -> (Self, Arc<Mutex<usize>>) {
        let calls = Arc::new(Mutex::new(0));
        (
            Self {
                answer,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl DecisionProvider for FixedProvider {
    async fn predict(&mut self, _observation: &Observation) -> Result<ActionCode, PolicyError> {
        *self.calls.lock().unwrap() += 1;
        match self.answer {
            Ok(action) => Ok(action),
            Err(code) => ActionCode::try_from(code),
        }
    }
}
