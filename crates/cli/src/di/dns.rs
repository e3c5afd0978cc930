use splitdns_application::services::{EngineOptions, ResolutionEngine, ResponseSynthesizer};
use splitdns_application::use_cases::{HandleDnsQueryUseCase, LoadDomainPolicyUseCase};
use splitdns_domain::Config;
use splitdns_infrastructure::dns::{
    DnsServerHandler, ErrorHook, NetworkUpstreamTransport, ResolutionEventEmitter,
};
use splitdns_infrastructure::domain_list;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct DnsServices {
    pub handler: DnsServerHandler,
    pub error_hook: JoinHandle<()>,
}

impl DnsServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing DNS services");

        let policy = Arc::new(Self::load_policy(config).await);

        let primary = config.primary_group()?;
        let alternate = config.alternate_group()?;
        match &alternate {
            Some(alternate) => info!(
                primary = primary.name(),
                primary_servers = ?primary.servers(),
                alternate = alternate.name(),
                alternate_servers = ?alternate.servers(),
                "Split forwarding enabled"
            ),
            None => info!(
                primary = primary.name(),
                primary_servers = ?primary.servers(),
                "No alternate group configured, forwarding everything to the primary group"
            ),
        }

        let engine = ResolutionEngine::new(
            policy,
            primary,
            alternate,
            Arc::new(NetworkUpstreamTransport::new()),
            EngineOptions::from_config(config),
        );

        let (emitter, rx) = ResolutionEventEmitter::new_enabled();
        let error_hook = ErrorHook::new(config.logging.verbose).start(rx);

        let use_case = HandleDnsQueryUseCase::new(Arc::new(engine), Arc::new(emitter))
            .with_synthesizer(ResponseSynthesizer::new(config.dns.normalize_rcode))
            .with_exhausted_response(config.dns.exhausted_response);

        Ok(Self {
            handler: DnsServerHandler::new(Arc::new(use_case)),
            error_hook,
        })
    }

    async fn load_policy(config: &Config) -> splitdns_domain::DomainPolicySet {
        let source = match config.policy.domain_list_source() {
            Some(location) => match domain_list::source_for(location) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!(source = location, error = %e, "Cannot open domain list source");
                    None
                }
            },
            None => {
                info!("No domain list configured");
                None
            }
        };
        LoadDomainPolicyUseCase::new(source)
            .execute(&config.policy)
            .await
    }
}
