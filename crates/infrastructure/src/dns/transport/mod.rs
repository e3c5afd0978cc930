pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use splitdns_application::ports::{UdpReply, UpstreamTransport};
use splitdns_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

/// Plain-socket upstream transport: a fresh UDP socket per attempt and a
/// fresh TCP connection per truncation retry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkUpstreamTransport;

impl NetworkUpstreamTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpstreamTransport for NetworkUpstreamTransport {
    async fn exchange_udp(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<UdpReply, DomainError> {
        udp::exchange(server, query, timeout).await
    }

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        tcp::exchange(server, query, timeout).await
    }
}
