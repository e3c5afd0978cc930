use clap::Parser;
use splitdns_domain::config::split_server_list;
use splitdns_domain::CliOverrides;
use std::time::Duration;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "splitdns")]
#[command(version)]
#[command(about = "splitdns - conditional forwarding DNS resolver")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (ip:port)
    #[arg(short = 'b', long = "bindip", value_name = "ADDR")]
    bind: Option<String>,

    /// Primary group servers, comma separated
    #[arg(long = "updns", value_name = "SERVERS")]
    primary_servers: Option<String>,

    /// Default port for primary servers
    #[arg(long = "upport", value_name = "PORT")]
    primary_port: Option<u32>,

    /// Client subnet sent to the primary group
    #[arg(long = "upecs", value_name = "SUBNET")]
    primary_ecs: Option<String>,

    /// Alternate group servers, comma separated
    #[arg(long = "puredns", value_name = "SERVERS")]
    alternate_servers: Option<String>,

    /// Default port for alternate servers
    #[arg(long = "pureport", value_name = "PORT")]
    alternate_port: Option<u32>,

    /// Client subnet sent to the alternate group
    #[arg(long = "pureecs", value_name = "SUBNET")]
    alternate_ecs: Option<String>,

    /// UDP listener workers (0 disables UDP)
    #[arg(long = "udp", value_name = "N")]
    udp_workers: Option<usize>,

    /// TCP listener workers (0 disables TCP)
    #[arg(long = "tcp", value_name = "N")]
    tcp_workers: Option<usize>,

    /// Primary domain list: file path or http(s) URL
    #[arg(long = "list", value_name = "LOCATION")]
    domain_list: Option<String>,

    /// Per-server query timeout in milliseconds
    #[arg(long = "timeout", value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Answer REFUSED to ANY queries
    #[arg(long = "ban-any", alias = "banAny")]
    ban_any: bool,

    /// Log every answer and full error details
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            udp_workers: self.udp_workers,
            tcp_workers: self.tcp_workers,
            primary_servers: self.primary_servers.as_deref().map(split_server_list),
            primary_port: self.primary_port,
            primary_ecs: self.primary_ecs.clone(),
            alternate_servers: self.alternate_servers.as_deref().map(split_server_list),
            alternate_port: self.alternate_port,
            alternate_ecs: self.alternate_ecs.clone(),
            query_timeout_ms: self.timeout_ms,
            ban_any: self.ban_any,
            domain_list: self.domain_list.clone(),
            verbose: self.verbose,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;

    bootstrap::init_logging(&config);
    bootstrap::config::log_config(cli.config.as_deref(), &config);

    info!("Starting splitdns v{}", env!("CARGO_PKG_VERSION"));

    let dns_services = di::DnsServices::new(&config).await?;
    let bind_addr = config.bind_addr()?;
    let options = server::ListenerOptions {
        udp_workers: config.server.udp_workers,
        tcp_workers: config.server.tcp_workers,
        tcp_idle_timeout: Duration::from_millis(config.server.tcp_idle_timeout_ms),
    };

    let mut dns_server = tokio::spawn(server::start_dns_server(
        bind_addr,
        dns_services.handler,
        options,
    ));

    tokio::select! {
        result = &mut dns_server => {
            match result {
                Ok(Ok(())) => info!("DNS server stopped"),
                Ok(Err(e)) => {
                    error!(error = %e, "DNS server error");
                    return Err(e);
                }
                Err(e) => {
                    error!(error = %e, "DNS server task failed");
                    return Err(e.into());
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            dns_server.abort();
        }
    }

    dns_services.error_hook.abort();
    info!("Server shutdown complete");
    Ok(())
}
