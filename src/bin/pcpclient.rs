//! pcpclient - request a single PCP port mapping
//!
//! Sends one MAP request to the gateway, waits for the answer and prints
//! the mapping the gateway granted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use tracing::{error, Instrument, Level};

use pcp_client::config::{PcpConfig, TransportProtocol};
use pcp_client::service::run_map;
use pcp_client::utils::{app_span, init_logging};
use pcp_client::MappingResult;

/// Request a port mapping from a PCP gateway
#[derive(Parser, Debug)]
#[command(name = "pcpclient")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gateway address (numeric IPv4 or IPv6)
    #[arg(short = 's', long = "server")]
    server: Option<String>,

    /// Local address to send from
    #[arg(short = 'l', long = "local")]
    local: Option<String>,

    /// Internal port to map
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Map a TCP port (default)
    #[arg(short = 't', long = "tcp", conflicts_with = "udp")]
    tcp: bool,

    /// Map a UDP port
    #[arg(short = 'u', long = "udp")]
    udp: bool,

    /// Requested mapping lifetime in seconds
    #[arg(short = 'd', long = "lifetime")]
    lifetime: Option<u32>,

    /// Fail rather than accept a different external port
    #[arg(short = 'f', long = "prefer-failure")]
    prefer_failure: bool,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Print the mapping as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(PcpConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => PcpConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PcpConfig::default(),
        };

        if let Some(server) = self.server {
            config.client.server_address = server;
        }
        if let Some(local) = self.local {
            config.client.local_address = local;
        }
        if let Some(port) = self.port {
            config.client.port = port;
        }
        if self.udp {
            config.client.protocol = TransportProtocol::Udp;
        } else if self.tcp {
            config.client.protocol = TransportProtocol::Tcp;
        }
        if let Some(lifetime) = self.lifetime {
            config.client.requested_lifetime = lifetime;
        }
        if self.prefer_failure {
            config.client.prefer_failure = true;
        }
        if let Some(level) = self.log_level {
            config.logging.log_level = Level::from_str(&level)
                .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))?;
        }

        Ok((config, self.json))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("pcpclient: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, json) = cli.into_config()?;
    init_logging(&config.logging)?;
    config.validate_strict()?;

    let mapping = run_map(&config.client)
        .instrument(app_span(&config.logging))
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&mapping)?);
    } else {
        print_mapping(&mapping);
    }
    Ok(())
}

fn print_mapping(mapping: &MappingResult) {
    println!("Mapping nonce: {}", mapping.nonce);
    println!("Lifetime: {}", mapping.lifetime);
    println!("Epoch time: {}", mapping.epoch_time);
    println!("Protocol: {}", mapping.protocol);
    println!("Internal port: {}", mapping.internal_port);
    println!("External port: {}", mapping.external_port);
    println!("External IP: {}", mapping.external_address);
}
