//! Progressive page server.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use edge_sdk::edge_core::{RequestId, ServerConfig};
use edge_sdk::edge_observability::StructuredLogger;
use progressive_page::{app, AppState, LogSettings};

/// Serve a page whose sections stream in as their data arrives
#[derive(Parser, Debug)]
#[command(name = "progressive-page")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory served under /static, overrides the config file
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Human-readable debug logs
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn server_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = dir.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = LogSettings::from_verbose(cli.verbose);
    let logger = log.apply(
        StructuredLogger::new(RequestId::from_string("server")).with_workload("progressive-page"),
    );

    let config = cli.server_config()?;
    let bind = config.bind;
    let static_dir = config.static_dir.display().to_string();
    let state = AppState::new(config, log)?;

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    logger
        .info_builder("Listening")
        .field("addr", bind.to_string())
        .field("static_dir", static_dir)
        .emit();

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
