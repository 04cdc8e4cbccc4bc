//! DubCheck Server CLI
//!
//! Starts the DubCheck HTTP API.

use anyhow::Context;
use clap::Parser;
use dubcheck_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// DubCheck fact-checking API server
#[derive(Debug, Parser)]
#[command(name = "dubcheck-server", version, about)]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(short, long, env = "DUBCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the database path
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            warn!("No config file specified, using defaults");
            ServerConfig::default().with_env_overrides(|name| std::env::var(name).ok())
        }
    };

    if let Some(port) = cli.port {
        config.bind_port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    start_server(config).await?;
    Ok(())
}
