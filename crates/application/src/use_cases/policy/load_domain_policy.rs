use crate::ports::DomainListSource;
use splitdns_domain::config::PolicyConfig;
use splitdns_domain::DomainPolicySet;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the startup policy set. A missing or unreachable domain list is
/// logged and the set is built without it.
pub struct LoadDomainPolicyUseCase {
    source: Option<Arc<dyn DomainListSource>>,
}

impl LoadDomainPolicyUseCase {
    pub fn new(source: Option<Arc<dyn DomainListSource>>) -> Self {
        Self { source }
    }

    pub async fn execute(&self, config: &PolicyConfig) -> DomainPolicySet {
        let mut builder = DomainPolicySet::builder()
            .local_suffixes(config.local_suffixes.iter().map(String::as_str))
            .banned_suffixes(config.banned_suffixes.iter().map(String::as_str))
            .reverse_zones(config.reverse_zones);

        if let Some(source) = &self.source {
            match source.fetch().await {
                Ok(text) => builder = builder.primary_list(&text),
                Err(e) => {
                    warn!(source = source.location(), error = %e, "Domain list unavailable, continuing without it");
                }
            }
        }

        let policy = builder.build();
        info!(
            primary_suffixes = policy.primary_len(),
            reverse_zones = ?policy.reverse_zone_policy(),
            "Domain policy loaded"
        );
        policy
    }
}
