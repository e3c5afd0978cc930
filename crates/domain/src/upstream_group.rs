use crate::errors::DomainError;
use crate::subnet_hint::SubnetHint;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Ordered list of upstream servers sharing a role.
///
/// Order is attempt order. The list is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamGroup {
    name: Arc<str>,
    servers: Vec<SocketAddr>,
    ecs_override: Option<SubnetHint>,
    timeout: Duration,
}

impl UpstreamGroup {
    pub fn new(name: impl Into<Arc<str>>, servers: Vec<SocketAddr>) -> Result<Self, DomainError> {
        let name = name.into();
        if servers.is_empty() {
            return Err(DomainError::ConfigError(format!(
                "upstream group '{}' has no servers",
                name
            )));
        }
        Ok(Self {
            name,
            servers,
            ecs_override: None,
            timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    pub fn with_ecs_override(mut self, hint: Option<SubnetHint>) -> Self {
        self.ecs_override = hint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    pub fn ecs_override(&self) -> Option<&SubnetHint> {
        self.ecs_override.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
