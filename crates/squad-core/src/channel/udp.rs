//! UDP transport using a tokio socket per agent.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use super::{Transport, TransportError};

/// Large enough for any see/sense message the server sends.
const RECV_BUFFER: usize = 8192;

pub struct UdpTransport {
    socket: UdpSocket,
    server: SocketAddr,
    buf: Vec<u8>,
}

impl UdpTransport {
    /// Bind an ephemeral local port and target `server` (`host:port`).
    pub async fn connect(server: &str) -> Result<Self, TransportError> {
        let server = tokio::net::lookup_host(server)
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| TransportError::Resolve(server.to_string()))?;
        Self::bind(server).await
    }

    pub async fn bind(server: SocketAddr) -> Result<Self, TransportError> {
        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await.map_err(TransportError::Bind)?;
        Ok(Self {
            socket,
            server,
            buf: vec![0; RECV_BUFFER],
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.socket
            .send_to(text.as_bytes(), self.server)
            .await
            .map(|_| ())
            .map_err(TransportError::Send)
    }

    async fn recv(&mut self, timeout: Duration) -> Result<Option<String>, TransportError> {
        let received = tokio::time::timeout(timeout, self.socket.recv_from(&mut self.buf)).await;
        match received {
            Err(_) => Ok(None),
            Ok(Ok((n, _))) => Ok(Some(String::from_utf8_lossy(&self.buf[..n]).into_owned())),
            // ICMP echoes of earlier sends; nothing to read this time.
            Ok(Err(e))
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionRefused
                        | ErrorKind::ConnectionReset
                        | ErrorKind::Interrupted
                        | ErrorKind::WouldBlock
                ) =>
            {
                Ok(None)
            }
            Ok(Err(e)) => Err(TransportError::Receive(e)),
        }
    }
}
