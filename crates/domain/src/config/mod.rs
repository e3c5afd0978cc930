pub mod dns;
pub mod errors;
pub mod logging;
pub mod policy;
pub mod root;
pub mod server;
pub mod upstream;

pub use dns::{DnsConfig, ExhaustedResponse};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use policy::PolicyConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::{parse_server_addr, split_server_list, UpstreamGroupConfig};
