use super::ecs_option_builder::{find_client_subnet, EcsOptionBuilder};
use super::upstream_group_resolver::{UpstreamAnswer, UpstreamGroupResolver};
use crate::ports::UpstreamTransport;
use hickory_proto::op::Message;
use splitdns_domain::{Classification, Config, DomainError, DomainPolicySet, QueryContext, UpstreamGroup};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub ban_any: bool,
    pub group_fallback: bool,
    pub tcp_fallback: bool,
    pub verbose: bool,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ban_any: config.dns.ban_any,
            group_fallback: config.dns.group_fallback,
            tcp_fallback: config.dns.tcp_fallback,
            verbose: config.logging.verbose,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ban_any: false,
            group_fallback: true,
            tcp_fallback: true,
            verbose: false,
        }
    }
}

/// Terminal states reached without error.
#[derive(Debug)]
pub enum Resolution {
    /// Name under a local suffix; answered NXDOMAIN with no upstream I/O.
    Local,
    Answered {
        classification: Classification,
        answer: UpstreamAnswer,
    },
}

/// Classifies a query, picks the upstream group(s) and runs the attempt loop.
///
/// Shared state is read-only after construction, so one engine serves every
/// concurrent request.
pub struct ResolutionEngine {
    policy: Arc<DomainPolicySet>,
    primary: UpstreamGroup,
    alternate: Option<UpstreamGroup>,
    resolver: UpstreamGroupResolver,
    options: EngineOptions,
}

impl ResolutionEngine {
    pub fn new(
        policy: Arc<DomainPolicySet>,
        primary: UpstreamGroup,
        alternate: Option<UpstreamGroup>,
        transport: Arc<dyn UpstreamTransport>,
        options: EngineOptions,
    ) -> Self {
        let resolver = UpstreamGroupResolver::new(transport)
            .with_tcp_fallback(options.tcp_fallback)
            .with_verbose(options.verbose);
        Self {
            policy,
            primary,
            alternate,
            resolver,
            options,
        }
    }

    pub fn policy(&self) -> &DomainPolicySet {
        &self.policy
    }

    /// `Refused` for banned names and (when enabled) ANY queries; `Local` for
    /// special suffixes; otherwise the first group's answer, falling back to
    /// the other group once when the first is exhausted.
    pub async fn resolve(
        &self,
        request: &Message,
        ctx: &QueryContext,
    ) -> Result<Resolution, DomainError> {
        if self.policy.is_banned(&ctx.name) {
            return Err(DomainError::Refused(format!("{} is banned", ctx.name)));
        }
        if self.options.ban_any && ctx.record_type.is_any() {
            return Err(DomainError::Refused("ANY queries are disabled".to_string()));
        }

        let classification = self.policy.classify(&ctx.name);
        if classification == Classification::Local {
            debug!(domain = %ctx.name, "Local zone, answering NXDOMAIN");
            return Ok(Resolution::Local);
        }

        let (first, second) = self.plan(classification);
        debug!(
            domain = %ctx.name,
            classification = %classification,
            group = first.name(),
            "Dispatching query"
        );

        match self.dispatch(first, request, ctx).await {
            Ok(answer) => Ok(Resolution::Answered {
                classification,
                answer,
            }),
            Err(DomainError::UpstreamExhausted { group }) => {
                let Some(second) = second.filter(|_| self.options.group_fallback) else {
                    return Err(DomainError::UpstreamExhausted { group });
                };
                warn!(
                    domain = %ctx.name,
                    failed_group = %group,
                    group = second.name(),
                    "Group exhausted, trying other group"
                );
                let answer = self.dispatch(second, request, ctx).await.map_err(|e| match e {
                    DomainError::UpstreamExhausted { group: other } => {
                        DomainError::UpstreamExhausted {
                            group: format!("{},{}", group, other),
                        }
                    }
                    e => e,
                })?;
                Ok(Resolution::Answered {
                    classification,
                    answer,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Group order for a classification. Without an alternate group every
    /// query goes to the primary group alone.
    fn plan(&self, classification: Classification) -> (&UpstreamGroup, Option<&UpstreamGroup>) {
        match (&self.alternate, classification) {
            (None, _) => (&self.primary, None),
            (Some(alternate), Classification::Primary) => (&self.primary, Some(alternate)),
            (Some(alternate), _) => (alternate, Some(&self.primary)),
        }
    }

    async fn dispatch(
        &self,
        group: &UpstreamGroup,
        request: &Message,
        ctx: &QueryContext,
    ) -> Result<UpstreamAnswer, DomainError> {
        let mut outgoing = request.clone();
        let ecs = EcsOptionBuilder::build(
            find_client_subnet(request),
            ctx.client_ip,
            group.ecs_override(),
        );
        EcsOptionBuilder::apply(&mut outgoing, &ecs);
        self.resolver.resolve_with_fallback(group, &outgoing).await
    }
}
