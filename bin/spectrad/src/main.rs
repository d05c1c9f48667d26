//! ---
//! spx_section: "01-core-functionality"
//! spx_subsection: "binary"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Binary entrypoint for the Spectra API daemon."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spectra_api::{spawn_api_server, ApiState};
use spectra_common::config::AppConfig;
use spectra_common::logging::init_tracing;
use spectra_metrics::{new_registry, spawn_http_server, ServiceMetrics};
use tokio::signal;
use tracing::info;

const SERVICE_NAME: &str = "spectrad";
const DEFAULT_CONFIG: &str = "configs/spectra.toml";

#[derive(Debug, Parser)]
#[command(author, version, about = "Spectra API daemon", long_about = None)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "ADDR", help = "Override the API listen address")]
    listen: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Serve the HTTP API (default)")]
    Run,
    #[command(about = "Load and validate configuration, then exit")]
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from(DEFAULT_CONFIG));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    config.apply_env_overrides();
    if let Some(listen) = cli.listen {
        config.api.listen = listen;
    }
    config
        .validate()
        .context("configuration invalid after applying overrides")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_tracing(SERVICE_NAME, &config.logging, config.environment)?;
            match &loaded.source {
                Some(path) => info!(path = %path.display(), "configuration loaded"),
                None => info!("no configuration file found; using defaults"),
            }
            run(config).await
        }
        Commands::CheckConfig => {
            ApiState::new(&config, ServiceMetrics::standalone()?)
                .context("configuration rejected by the API")?;
            let source = loaded
                .source
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| String::from("<defaults>"));
            println!(
                "Configuration OK\nSource: {}\nEnvironment: {}\nListen: {}\nSubscription cost: {}",
                source,
                config.environment.as_str(),
                config.api.listen,
                config.roi.subscription_cost
            );
            Ok(())
        }
    }
}

async fn run(config: AppConfig) -> Result<()> {
    let registry = new_registry();
    let metrics = ServiceMetrics::new(registry.clone())?;
    metrics.inc_start();
    metrics.set_build_info(env!("CARGO_PKG_VERSION"), config.environment.as_str());

    let metrics_server = if config.metrics.enabled {
        info!(address = %config.metrics.listen, "metrics exporter enabled");
        Some(spawn_http_server(registry, config.metrics.listen)?)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let state = Arc::new(ApiState::new(&config, metrics)?);
    let api_server = spawn_api_server(state, config.api.listen)?;
    info!(
        address = %api_server.addr(),
        environment = config.environment.as_str(),
        "spectra api running; waiting for termination signal"
    );

    shutdown_signal().await?;
    info!("termination signal received; shutting down");

    api_server.shutdown().await?;
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }
    info!("shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    tokio::select! {
        result = signal::ctrl_c() => result.context("failed to listen for ctrl-c")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")
}
