//! CLI command definitions and dispatch.

pub mod access;
pub mod history;
pub mod migrate;
pub mod serve;
pub mod sync;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use naranja_core::config::{AppConfig, StoreProvider};
use naranja_core::error::AppError;
use naranja_database::{DatabasePool, MemoryStore, Stores};

use crate::output::OutputFormat;

/// Naranja: role and assignment consistency service
#[derive(Debug, Parser)]
#[command(name = "naranja", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "NARANJA_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Reconcile assignments with role curricula
    Sync(sync::SyncArgs),
    /// Role change history
    History(history::HistoryArgs),
    /// Inspect the access policy
    Access(access::AccessArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self.load_config()?).await,
            Commands::Migrate(args) => migrate::execute(args, self.load_config()?).await,
            Commands::Sync(args) => sync::execute(args, self.load_config()?, self.format).await,
            Commands::History(args) => {
                history::execute(args, self.load_config()?, self.format).await
            }
            Commands::Access(args) => access::execute(args, self.format),
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.env)
    }
}

/// Helper: open the configured backing store
///
/// Returns the pool too when the store is Postgres so callers can close it.
pub async fn open_stores(config: &AppConfig) -> Result<(Stores, Option<DatabasePool>), AppError> {
    match config.database.provider {
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            Ok((Stores::postgres(pool.pool().clone()), Some(pool)))
        }
        StoreProvider::Memory => Ok((Stores::memory(Arc::new(MemoryStore::new())), None)),
    }
}

/// Helper: require a Postgres store for commands that act on persisted data
pub async fn open_persistent_stores(config: &AppConfig) -> Result<(Stores, DatabasePool), AppError> {
    match open_stores(config).await? {
        (stores, Some(pool)) => Ok((stores, pool)),
        (_, None) => Err(AppError::configuration(
            "This command needs database.provider = \"postgres\"",
        )),
    }
}
