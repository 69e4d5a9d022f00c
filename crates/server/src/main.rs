//! Stash server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use stash_core::AppConfig;
use stash_server::{AppState, create_router, spawn_retention_sweeper};
use stash_storage::{FilesystemRepository, ItemRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stash - a JSON document store over HTTP
#[derive(Parser, Debug)]
#[command(name = "stashd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "STASH_CONFIG",
        default_value = "config/server.yaml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("Stash v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Yaml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // Check for STASH_ environment variables (excluding STASH_CONFIG which is just the path)
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("STASH_") && key != "STASH_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: stashd --config /path/to/config.yaml\n  \
             2. Environment variables: STASH_SERVER__PORT=8080 \
             STASH_AUTH__SECRET=your-secret stashd\n\n\
             See config/server.example.yaml for example configuration.\n\
             Set STASH_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("STASH_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Fail fast on an unparseable sweep timezone rather than at first fire
    config
        .retention
        .sweep_offset()
        .context("invalid retention.utc_offset")?;

    // Initialize the item repository
    let repository: Arc<dyn ItemRepository> = Arc::new(
        FilesystemRepository::new(&config.storage.path)
            .await
            .context("failed to initialize item repository")?,
    );

    // Verify storage is usable before accepting requests
    repository
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(path = %config.storage.path.display(), "Item repository initialized");

    // Create application state (the in-memory store starts empty)
    let state = AppState::new(config, repository);

    // Spawn the daily retention sweeper
    let _sweeper = spawn_retention_sweeper(state.clone());
    tracing::info!(
        max_age_days = state.config.retention.max_age_days,
        utc_offset = %state.config.retention.utc_offset,
        "Retention sweeper spawned"
    );

    // Create router
    let app = create_router(state.clone());

    // Parse bind address
    let addr: SocketAddr = state
        .config
        .server
        .socket_addr()
        .parse()
        .context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
