use super::errors::ConfigError;
use crate::subnet_hint::SubnetHint;
use crate::upstream_group::UpstreamGroup;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UpstreamGroupConfig {
    pub name: String,

    /// `ip` or `ip:port` entries, tried in order.
    pub servers: Vec<String>,

    /// Port applied to entries given as a bare IP.
    #[serde(default = "default_port")]
    pub port: u32,

    /// Fixed client subnet advertised instead of the client's own address.
    #[serde(default)]
    pub ecs: Option<String>,

    /// Overrides `dns.query_timeout_ms` for this group.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl UpstreamGroupConfig {
    pub fn new(name: impl Into<String>, servers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            servers,
            port: default_port(),
            ecs: None,
            timeout_ms: None,
        }
    }

    pub fn server_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        let port = validate_port(self.port, &self.name)?;
        self.servers
            .iter()
            .map(|s| parse_server_addr(s, port))
            .collect()
    }

    pub fn ecs_hint(&self) -> Result<Option<SubnetHint>, ConfigError> {
        self.ecs
            .as_deref()
            .map(|raw| {
                raw.parse::<SubnetHint>().map_err(|e| {
                    ConfigError::Validation(format!("group '{}' ecs: {}", self.name, e))
                })
            })
            .transpose()
    }

    /// Builds the runtime group; `default_timeout_ms` applies when the group
    /// sets none of its own.
    pub fn to_group(&self, default_timeout_ms: u64) -> Result<UpstreamGroup, ConfigError> {
        let timeout_ms = self.timeout_ms.unwrap_or(default_timeout_ms);
        if timeout_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "group '{}' timeout cannot be 0",
                self.name
            )));
        }
        let group = UpstreamGroup::new(self.name.as_str(), self.server_addrs()?)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(group
            .with_ecs_override(self.ecs_hint()?)
            .with_timeout(Duration::from_millis(timeout_ms)))
    }
}

fn validate_port(port: u32, group: &str) -> Result<u16, ConfigError> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ConfigError::Validation(format!(
            "group '{}' port {} out of range 1-65535",
            group, port
        ))),
    }
}

/// Parses `ip`, `ip:port` or `[ipv6]:port`; bare IPs get `default_port`.
pub fn parse_server_addr(raw: &str, default_port: u16) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }
    let addr: SocketAddr = raw
        .parse()
        .map_err(|_| ConfigError::Validation(format!("invalid server address '{}'", raw)))?;
    if addr.port() == 0 {
        return Err(ConfigError::Validation(format!(
            "invalid port in server address '{}'",
            raw
        )));
    }
    Ok(addr)
}

/// Splits a comma-separated server list. ASCII and full-width commas are
/// both accepted; empty items are dropped.
pub fn split_server_list(csv: &str) -> Vec<String> {
    csv.split([',', '\u{ff0c}'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_port() -> u32 {
    53
}
