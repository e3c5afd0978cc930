use crate::policy::ReverseZonePolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN_LIST: &str =
    "https://raw.githubusercontent.com/HMBSbige/Text_Translation/master/chndomains.txt";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Path or http(s) URL of the primary domain list. Empty disables loading.
    #[serde(default = "default_domain_list")]
    pub domain_list: String,

    #[serde(default = "default_local_suffixes")]
    pub local_suffixes: Vec<String>,

    #[serde(default)]
    pub banned_suffixes: Vec<String>,

    #[serde(default)]
    pub reverse_zones: ReverseZonePolicy,
}

impl PolicyConfig {
    pub fn domain_list_source(&self) -> Option<&str> {
        let source = self.domain_list.trim();
        (!source.is_empty()).then_some(source)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            domain_list: default_domain_list(),
            local_suffixes: default_local_suffixes(),
            banned_suffixes: Vec::new(),
            reverse_zones: ReverseZonePolicy::default(),
        }
    }
}

fn default_domain_list() -> String {
    DEFAULT_DOMAIN_LIST.to_string()
}

fn default_local_suffixes() -> Vec<String> {
    vec!["lan".into(), "local".into(), "localdomain".into()]
}
