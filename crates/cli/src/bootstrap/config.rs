use splitdns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}

/// Logged once the subscriber is installed, since loading happens before it.
pub fn log_config(config_path: Option<&str>, config: &Config) {
    info!(
        config_file = config_path.unwrap_or("default"),
        bind = %config.server.bind_address,
        udp_workers = config.server.udp_workers,
        tcp_workers = config.server.tcp_workers,
        primary = ?config.dns.primary.servers,
        alternate = ?config.dns.alternate.as_ref().map(|g| &g.servers),
        timeout_ms = config.dns.query_timeout_ms,
        "Configuration loaded"
    );
}
