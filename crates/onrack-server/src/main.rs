//! Onrack - node inventory service.

use anyhow::Context;
use clap::Parser;
use onrack_server::config::Settings;
use onrack_server::observability::{init_logging, LogFormat};
use onrack_server::runner::Runner;
use std::net::IpAddr;
use std::path::PathBuf;

/// Onrack - hardware node inventory service
#[derive(Parser, Debug)]
#[command(name = "onrack")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "onrack.yaml")]
    config: PathBuf,

    /// HTTP listen address
    #[arg(long)]
    httpaddr: Option<IpAddr>,

    /// HTTP listen port
    #[arg(long)]
    httpport: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(addr) = self.httpaddr {
            settings.httpaddr = addr;
        }
        if let Some(port) = self.httpport {
            settings.httpport = port;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
        if let Some(format) = self.log_format {
            settings.log_format = format;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(Some(args.config.as_path())).context("failed to load settings")?;
    let settings = args.apply(settings).validated()?;

    init_logging(&settings.log_level, LogFormat::parse(&settings.log_format));
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %settings.listen_addr(),
        file_store_root = %settings.file_store_root.display(),
        "Starting onrack"
    );

    let runner = Runner::new(settings);
    runner.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    runner.stop().await
}
