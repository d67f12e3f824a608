//! Walk-in Queue Engine - Main Entry Point
//!
//! Composition root: config, logging, SQLite store, use cases, HTTP server.

mod config;
mod logging;

use anyhow::{Context, Result};
use config::DaemonConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use walkin_api_http::{AppState, EngineSettings, HttpServer, HttpServerConfig};
use walkin_core::application::CommitRetryPolicy;
use walkin_core::port::id_provider::UuidProvider;
use walkin_core::port::time_provider::SystemTimeProvider;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteShopStore};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    let _log_guard = logging::init_logging(&config)?;

    info!("Walk-in queue engine v{} starting...", walkin_core::VERSION);

    // 3. Initialize database
    if !config.db_path.starts_with("sqlite:") {
        if let Some(parent) = Path::new(&config.db_path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.database_url())
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let store = Arc::new(SqliteShopStore::new(pool.clone()));
    let settings = EngineSettings {
        retry: CommitRetryPolicy::new(config.max_commit_attempts, config.retry_base_delay_ms),
        trial_days: config.trial_days,
    };
    let state = AppState::new(
        store,
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
        settings,
    );

    // 5. Serve until Ctrl+C
    let server = HttpServer::new(
        HttpServerConfig {
            host: config.http_host.clone(),
            port: config.http_port,
        },
        state,
    );

    info!("System ready. Press Ctrl+C to shutdown");
    server.serve(shutdown_signal()).await?;

    // 6. Graceful shutdown
    pool.close().await;
    info!("Shutdown complete.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received. Draining connections...");
}
