//! TCP exchange with one upstream server, used to retry truncated UDP
//! answers. Messages carry the 2-byte length prefix of RFC 1035 §4.2.2.

use splitdns_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub async fn exchange(
    server: SocketAddr,
    query: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, DomainError> {
    tokio::time::timeout(timeout, exchange_inner(server, query))
        .await
        .map_err(|_| DomainError::UpstreamTimeout { server })?
}

async fn exchange_inner(server: SocketAddr, query: &[u8]) -> Result<Vec<u8>, DomainError> {
    let mut stream = TcpStream::connect(server).await.map_err(|e| {
        DomainError::IoError(format!("Connection refused by TCP server {}: {}", server, e))
    })?;
    stream.set_nodelay(true).map_err(|e| {
        DomainError::IoError(format!("Failed to set TCP_NODELAY on {}: {}", server, e))
    })?;

    send_with_length_prefix(&mut stream, query).await?;
    debug!(server = %server, message_len = query.len(), "TCP query sent");

    let response = read_with_length_prefix(&mut stream)
        .await?
        .ok_or_else(|| DomainError::IoError(format!("TCP server {} closed the connection", server)))?;
    debug!(server = %server, response_len = response.len(), "TCP response received");

    Ok(response)
}

pub async fn send_with_length_prefix<S>(stream: &mut S, message: &[u8]) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message.len()).map_err(|_| {
        DomainError::FormatError(format!(
            "Message too large for TCP: {} bytes (max {})",
            message.len(),
            MAX_TCP_MESSAGE_SIZE
        ))
    })?;

    let mut framed = Vec::with_capacity(message.len() + 2);
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message);

    stream
        .write_all(&framed)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

/// Reads one framed message. `Ok(None)` means the peer closed the stream
/// cleanly before a new length prefix.
pub async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Option<Vec<u8>>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            return Err(DomainError::IoError(format!(
                "Failed to read message length: {}",
                e
            )))
        }
    }

    let length = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; length];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message body: {}", e)))?;

    Ok(Some(message))
}
