//! UDP exchange with one upstream server (RFC 1035 §4.2.1).
//!
//! Every attempt binds a fresh ephemeral socket so replies to earlier,
//! abandoned attempts can never be read by a later one. The source address of
//! the reply is reported as-is; checking it is the caller's business.

use splitdns_application::ports::UdpReply;
use splitdns_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest upstream reply accepted: a full UDP datagram, so a server that
/// ignores the advertised payload size is still read intact.
pub const MAX_UDP_RESPONSE_SIZE: usize = u16::MAX as usize;

fn ephemeral_bind_addr(server: SocketAddr) -> SocketAddr {
    if server.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    }
}

/// Sends `query` and waits for a single datagram. The whole exchange shares
/// one deadline.
pub async fn exchange(
    server: SocketAddr,
    query: &[u8],
    timeout: Duration,
) -> Result<UdpReply, DomainError> {
    tokio::time::timeout(timeout, exchange_inner(server, query))
        .await
        .map_err(|_| DomainError::UpstreamTimeout { server })?
}

async fn exchange_inner(server: SocketAddr, query: &[u8]) -> Result<UdpReply, DomainError> {
    let socket = UdpSocket::bind(ephemeral_bind_addr(server))
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

    let bytes_sent = socket.send_to(query, server).await.map_err(|e| {
        DomainError::IoError(format!("Failed to send UDP query to {}: {}", server, e))
    })?;

    debug!(server = %server, bytes_sent, "UDP query sent");

    let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
    let (bytes_received, from) = socket.recv_from(&mut recv_buf).await.map_err(|e| {
        DomainError::IoError(format!(
            "Failed to receive UDP response from {}: {}",
            server, e
        ))
    })?;
    recv_buf.truncate(bytes_received);

    debug!(server = %server, from = %from, bytes_received, "UDP response received");

    Ok(UdpReply {
        bytes: recv_buf,
        from,
    })
}
