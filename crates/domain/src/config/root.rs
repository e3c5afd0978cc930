use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::policy::PolicyConfig;
use super::server::ServerConfig;
use super::upstream::{parse_server_addr, UpstreamGroupConfig};
use crate::upstream_group::UpstreamGroup;

const LOCAL_CONFIG_PATH: &str = "splitdns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/splitdns/config.toml";

/// Main configuration structure for splitdns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, worker counts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream groups and forwarding behaviour
    #[serde(default)]
    pub dns: DnsConfig,

    /// Domain list and fixed suffixes
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. splitdns.toml in current directory
    /// 3. /etc/splitdns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(workers) = overrides.udp_workers {
            self.server.udp_workers = workers;
        }
        if let Some(workers) = overrides.tcp_workers {
            self.server.tcp_workers = workers;
        }
        if let Some(servers) = overrides.primary_servers {
            self.dns.primary.servers = servers;
        }
        if let Some(port) = overrides.primary_port {
            self.dns.primary.port = port;
        }
        if let Some(ecs) = overrides.primary_ecs {
            self.dns.primary.ecs = Some(ecs);
        }
        if let Some(servers) = overrides.alternate_servers {
            match self.dns.alternate.as_mut() {
                Some(alternate) => alternate.servers = servers,
                None => self.dns.alternate = Some(UpstreamGroupConfig::new("pure", servers)),
            }
        }
        if self.dns.alternate.is_none()
            && (overrides.alternate_port.is_some() || overrides.alternate_ecs.is_some())
        {
            // Port or subnet alone: the alternate group reuses the primary servers.
            self.dns.alternate = Some(UpstreamGroupConfig::new(
                "pure",
                self.dns.primary.servers.clone(),
            ));
        }
        if let Some(alternate) = self.dns.alternate.as_mut() {
            if let Some(port) = overrides.alternate_port {
                alternate.port = port;
            }
            if let Some(ecs) = overrides.alternate_ecs {
                alternate.ecs = Some(ecs);
            }
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.dns.query_timeout_ms = timeout;
        }
        if overrides.ban_any {
            self.dns.ban_any = true;
        }
        if let Some(list) = overrides.domain_list {
            self.policy.domain_list = list;
        }
        if overrides.verbose {
            self.logging.verbose = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.server.udp_workers == 0 && self.server.tcp_workers == 0 {
            return Err(ConfigError::Validation(
                "UDP and TCP listeners are both disabled".to_string(),
            ));
        }

        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout cannot be 0".to_string(),
            ));
        }

        self.primary_group()?;
        self.alternate_group()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_server_addr(&self.server.bind_address, 53).map_err(|_| {
            ConfigError::Validation(format!(
                "invalid bind address '{}'",
                self.server.bind_address
            ))
        })
    }

    pub fn primary_group(&self) -> Result<UpstreamGroup, ConfigError> {
        self.dns.primary.to_group(self.dns.query_timeout_ms)
    }

    pub fn alternate_group(&self) -> Result<Option<UpstreamGroup>, ConfigError> {
        self.dns
            .alternate
            .as_ref()
            .map(|group| group.to_group(self.dns.query_timeout_ms))
            .transpose()
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub udp_workers: Option<usize>,
    pub tcp_workers: Option<usize>,
    pub primary_servers: Option<Vec<String>>,
    pub primary_port: Option<u32>,
    pub primary_ecs: Option<String>,
    pub alternate_servers: Option<Vec<String>>,
    pub alternate_port: Option<u32>,
    pub alternate_ecs: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub ban_any: bool,
    pub domain_list: Option<String>,
    pub verbose: bool,
    pub log_level: Option<String>,
}
