//! tripcast-server - HTTP server for the Tripcast dashboard

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use libtripcast::config::Config;
use libtripcast::credentials::CredentialStore;
use libtripcast::logging::{LogFormat, LoggingConfig};
use libtripcast::platforms::mastodon::MastodonPlatform;
use libtripcast::platforms::Platform;

use tripcast_server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tripcast-server")]
#[command(version)]
#[command(about = "Web backend for a travel-content social account")]
struct Cli {
    /// Address to bind (overrides config)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Path to the config file (overrides TRIPCAST_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = std::env::var("TRIPCAST_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);
    let level = std::env::var("TRIPCAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    LoggingConfig::new(format, level, cli.verbose).init();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path).context("Failed to load configuration")?,
        None => Config::load().context("Failed to load configuration")?,
    };
    let config = Arc::new(config);

    let credentials = Arc::new(CredentialStore::from_env());

    let static_dir = config.static_dir();
    std::fs::create_dir_all(&static_dir)
        .with_context(|| format!("Failed to create static directory {}", static_dir.display()))?;

    let platform: Arc<dyn Platform> = Arc::new(MastodonPlatform::new(
        &config.platform.instance,
        credentials.clone(),
    ));

    // Credential check is informative, not fatal: keys can be supplied
    // later through /api_keys.
    match platform.verify().await {
        Ok(account) => info!(account = %account, "Platform credentials verified"),
        Err(e) => warn!(error = %e, "Platform credentials not verified yet"),
    }

    let bind = cli.bind.clone().unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(config, credentials, platform)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(addr = %bind, "Tripcast server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install shutdown handler");
    }
}
