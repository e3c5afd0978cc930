use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// UDP listener sockets; 0 disables UDP.
    #[serde(default = "default_workers")]
    pub udp_workers: usize,

    /// TCP listener sockets; 0 disables TCP.
    #[serde(default = "default_workers")]
    pub tcp_workers: usize,

    #[serde(default = "default_tcp_idle_timeout_ms")]
    pub tcp_idle_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            udp_workers: default_workers(),
            tcp_workers: default_workers(),
            tcp_idle_timeout_ms: default_tcp_idle_timeout_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:53".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_tcp_idle_timeout_ms() -> u64 {
    10_000
}
