//! Start the Naranja server.

use clap::Args;

use naranja_core::config::AppConfig;
use naranja_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Skip database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting Naranja server...");
    println!("  Host:  {}", config.server.host);
    println!("  Port:  {}", config.server.port);
    println!("  Store: {:?}", config.database.provider);

    let (stores, pool) = super::open_stores(&config).await?;

    if let Some(pool) = &pool {
        if config.database.run_migrations && !args.no_migrate {
            println!("Running database migrations...");
            naranja_database::migration::run_migrations(pool.pool()).await?;
            println!("  Migrations applied successfully.");
        }
    }

    let result = naranja_api::run_server(config, stores).await;
    if let Some(pool) = pool {
        pool.close().await;
    }
    result
}
