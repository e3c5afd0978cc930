use async_trait::async_trait;
use splitdns_domain::DomainError;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Datagram received from an upstream together with the address it came from.
#[derive(Debug, Clone)]
pub struct UdpReply {
    pub bytes: Vec<u8>,
    pub from: SocketAddr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Udp,
    Tcp,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network exchange with one upstream server.
///
/// Implementations allocate their socket per call and enforce `timeout`,
/// returning [`DomainError::UpstreamTimeout`] when it expires.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn exchange_udp(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<UdpReply, DomainError>;

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError>;
}
