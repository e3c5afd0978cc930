//! splitdns Domain Layer
pub mod config;
pub mod errors;
pub mod policy;
pub mod query_context;
pub mod record_type;
pub mod subnet_hint;
pub mod upstream_group;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use policy::{normalize_domain, Classification, DomainPolicySet, ReverseZonePolicy};
pub use query_context::{QueryContext, QueryFlags, MIN_UDP_PAYLOAD};
pub use record_type::RecordType;
pub use subnet_hint::SubnetHint;
pub use upstream_group::{UpstreamGroup, DEFAULT_QUERY_TIMEOUT};
