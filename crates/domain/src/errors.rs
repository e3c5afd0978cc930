use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to load domain list from {source_name}: {reason}")]
    DomainListLoad { source_name: String, reason: String },

    #[error("Upstream timeout: {server}")]
    UpstreamTimeout { server: SocketAddr },

    #[error("Malformed reply from {server}: {reason}")]
    MalformedReply { server: SocketAddr, reason: String },

    #[error("All upstream servers in group '{group}' failed")]
    UpstreamExhausted { group: String },

    #[error("Remote endpoint mismatch: sent to {expected}, reply from {received}")]
    SpoofedReply {
        expected: SocketAddr,
        received: SocketAddr,
    },

    #[error("Query refused: {0}")]
    Refused(String),

    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// Transport-level faults that the attempt loop recovers from by moving
    /// to the next server.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamTimeout { .. }
                | DomainError::MalformedReply { .. }
                | DomainError::IoError(_)
        )
    }
}
