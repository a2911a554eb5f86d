//! Assignment synchronization commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use naranja_api::AppState;
use naranja_core::config::AppConfig;
use naranja_core::error::AppError;
use naranja_core::types::{RoleId, UserId};
use naranja_service::{BatchReport, RequestContext, SyncOptions, SyncOutcome};

use crate::output::{self, OutputFormat};

/// Arguments for sync commands
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Sync subcommand
    #[command(subcommand)]
    pub command: SyncCommand,
}

/// Sync subcommands
#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Reconcile every user holding a role
    Role {
        /// Role ID
        role_id: RoleId,
        /// Also remove obsolete assignments that were already completed
        #[arg(long)]
        prune_completed: bool,
        /// Skip the confirmation prompt for --prune-completed
        #[arg(short, long)]
        yes: bool,
    },
    /// Reconcile one user
    User {
        /// User ID
        user_id: UserId,
        /// Also remove obsolete assignments that were already completed
        #[arg(long)]
        prune_completed: bool,
    },
}

/// Failed user display row
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    /// User ID
    user_id: String,
    /// Error kind
    kind: String,
    /// Message
    message: String,
}

/// Execute sync commands
pub async fn execute(
    args: &SyncArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, pool) = super::open_persistent_stores(&config).await?;
    let state = AppState::new(config, &stores);
    let ctx = RequestContext::operator();

    let result = match &args.command {
        SyncCommand::Role {
            role_id,
            prune_completed,
            yes,
        } => {
            if *prune_completed && !*yes && !confirm_prune()? {
                println!("Cancelled.");
                pool.close().await;
                return Ok(());
            }

            let cancel = CancellationToken::new();
            let watcher = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                })
            };

            let report = state
                .synchronizer
                .sync_role(&ctx, *role_id, options(*prune_completed), cancel)
                .await;
            watcher.abort();
            report.map(|r| print_report(&r, format))
        }
        SyncCommand::User {
            user_id,
            prune_completed,
        } => state
            .synchronizer
            .sync_user(&ctx, *user_id, options(*prune_completed))
            .await
            .map(|o| print_outcome(&o, format)),
    };

    pool.close().await;
    result
}

fn options(prune_completed: bool) -> SyncOptions {
    SyncOptions {
        prune_completed: prune_completed.then_some(true),
    }
}

fn confirm_prune() -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt("This removes completed assignments no longer required. Continue?")
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

fn print_report(report: &BatchReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(report);
        return;
    }

    output::print_kv("Role", &report.role_id.to_string());
    output::print_kv("Users affected", &report.users_affected.to_string());
    output::print_kv("Inserted", &report.total_inserted.to_string());
    output::print_kv("Removed", &report.total_removed.to_string());
    if report.cancelled {
        output::print_warning(&format!(
            "Cancelled; {} users were not started",
            report.skipped
        ));
    }

    if report.is_partial() {
        output::print_warning(&format!("{} users failed:", report.errors.len()));
        let rows: Vec<FailureRow> = report
            .errors
            .iter()
            .map(|e| FailureRow {
                user_id: e.user_id.to_string(),
                kind: e.kind.to_string(),
                message: e.message.clone(),
            })
            .collect();
        output::print_list(&rows, format);
    } else if !report.cancelled {
        output::print_success("Role synchronized.");
    }
}

fn print_outcome(outcome: &SyncOutcome, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(outcome);
        return;
    }

    output::print_kv("User", &outcome.user_id.to_string());
    output::print_kv(
        "Role",
        &outcome
            .role_id
            .map_or_else(|| "-".to_string(), |r| r.to_string()),
    );
    output::print_kv("Inserted", &outcome.inserted.to_string());
    output::print_kv("Removed", &outcome.removed.to_string());
    output::print_kv(
        "Completed, kept",
        &outcome.retained_completed.to_string(),
    );
    output::print_success("User synchronized.");
}
