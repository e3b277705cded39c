//! ews-admin - early-warning SMS administration service
//!
//! Serves the operator web UI and JSON API on one port, backed by an
//! embedded SQLite database under the root folder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ews_admin::{build_router, AppState};
use ews_common::config::{
    load_toml_config_with_source, resolve_config_path, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver,
};
use ews_common::db::init_database;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for ews-admin
#[derive(Parser, Debug)]
#[command(name = "ews-admin")]
#[command(about = "Early-warning SMS administration service")]
#[command(version)]
struct Args {
    /// Root folder holding ews.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "EWS_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "EWS_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    // Loaded before tracing starts because it sets the log level; the
    // outcome is logged once the subscriber is installed
    let (toml_config, config_source) = load_toml_config_with_source(config_path.as_deref());

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ews_admin={0},ews_common={0},tower_http=info", toml_config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting EWS admin (ews-admin) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let root_folder = RootFolderResolver::new(args.root_folder.as_deref(), &toml_config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    if toml_config.gateway.client_secret.is_some() {
        warn!("Gateway client secret is stored in the config file; prefer the settings screen or EWS_HUBTEL_CLIENT_SECRET");
    }

    let defaults = CompiledDefaults::for_current_platform();
    let port = args.port.or(toml_config.port).unwrap_or(defaults.port);
    let bind = args
        .bind
        .or_else(|| toml_config.bind_address.clone())
        .unwrap_or(defaults.bind_address);

    let state = AppState::new(pool, toml_config.gateway.clone())
        .context("Failed to create application state")?;
    info!("SMS gateway: {}", state.gateway.base_url());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", bind, port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    info!("ews-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
