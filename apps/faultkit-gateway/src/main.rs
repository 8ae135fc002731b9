mod config;
mod proxy;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faultkit_http::HttpService;

use crate::config::AppConfig;
use crate::proxy::AppState;

/// FaultKit Gateway - reverse proxy with normalized problem+json failures
#[derive(Parser)]
#[command(name = "faultkit-gateway")]
#[command(about = "FaultKit Gateway - reverse proxy with normalized problem+json failures")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (FAULTKIT__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.override_port(port);
    }
    config.logging = config.logging.with_verbosity(cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Run => run(config).await,
    }
}

async fn run(config: AppConfig) -> Result<()> {
    faultkit::init_logging(&config.logging)?;

    let exceptions = &config.exception_handling;
    let downstream = HttpService::with_classifier(
        proxy::http_client(config.server.downstream_timeout()),
        exceptions.response_classifier(),
    );
    tracing::info!(
        converters = ?exceptions.converter_chain().names(),
        policy = ?exceptions.response_status_policy,
        "failure boundary configured"
    );

    let state = AppState::new(downstream, &config.server.downstream_base_url);
    let app = proxy::router(state, exceptions);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(
        addr = %config.server.bind_addr,
        downstream = %config.server.downstream_base_url,
        "FaultKit Gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("FaultKit Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
