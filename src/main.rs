//! Naranja Server: role and assignment consistency service.
//!
//! Main entry point that loads configuration, opens the backing store, and
//! starts the HTTP API.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use naranja_core::config::{AppConfig, StoreProvider};
use naranja_core::error::AppError;
use naranja_database::{DatabasePool, MemoryStore, Stores};

#[tokio::main]
async fn main() {
    let env = std::env::var("NARANJA_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Naranja v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Backing store ────────────────────────────────────
    let (stores, pool) = match config.database.provider {
        StoreProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                naranja_database::migration::run_migrations(pool.pool()).await?;
                tracing::info!("Database migrations complete");
            }

            (Stores::postgres(pool.pool().clone()), Some(pool))
        }
        StoreProvider::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            (Stores::memory(Arc::new(MemoryStore::new())), None)
        }
    };

    // ── Step 2: HTTP server ──────────────────────────────────────
    let result = naranja_api::run_server(config, stores).await;

    if let Some(pool) = pool {
        pool.close().await;
    }
    tracing::info!("Naranja stopped");
    result
}
