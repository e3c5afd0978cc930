use super::upstream::UpstreamGroupConfig;
use serde::{Deserialize, Serialize};

/// Reply sent to the client when every upstream failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustedResponse {
    #[default]
    Servfail,
    Drop,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Refuse queries of type ANY.
    #[serde(default)]
    pub ban_any: bool,

    /// Rewrite the return code of forwarded answers to NOERROR.
    #[serde(default = "default_true")]
    pub normalize_rcode: bool,

    /// Retry the other group once when the chosen one is exhausted.
    #[serde(default = "default_true")]
    pub group_fallback: bool,

    /// Retry truncated UDP replies over TCP against the same server.
    #[serde(default = "default_true")]
    pub tcp_fallback: bool,

    #[serde(default)]
    pub exhausted_response: ExhaustedResponse,

    #[serde(default = "default_primary")]
    pub primary: UpstreamGroupConfig,

    /// Without an alternate group every non-local query goes to `primary`.
    #[serde(default)]
    pub alternate: Option<UpstreamGroupConfig>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            ban_any: false,
            normalize_rcode: true,
            group_fallback: true,
            tcp_fallback: true,
            exhausted_response: ExhaustedResponse::default(),
            primary: default_primary(),
            alternate: None,
        }
    }
}

fn default_query_timeout_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_primary() -> UpstreamGroupConfig {
    UpstreamGroupConfig::new("up", vec!["101.226.4.6".to_string()])
}
