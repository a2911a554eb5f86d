//! Role change history commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use naranja_api::AppState;
use naranja_core::config::AppConfig;
use naranja_core::error::AppError;
use naranja_core::types::{PageRequest, UserId};
use naranja_entity::history::RoleChangeHistoryEntry;
use naranja_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for history commands
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// History subcommand
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// History subcommands
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List a user's role changes, newest first
    List {
        /// User ID
        user_id: UserId,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Entries per page
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
    /// Report consecutive entries repeating the same transition
    Duplicates {
        /// User ID
        user_id: UserId,
    },
}

/// History entry display row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// Entry ID
    id: String,
    /// When
    changed_at: String,
    /// Old role
    old_role: String,
    /// New role
    new_role: String,
    /// Old department
    old_department: String,
    /// New department
    new_department: String,
    /// Changed by
    changed_by: String,
}

impl From<&RoleChangeHistoryEntry> for HistoryRow {
    fn from(e: &RoleChangeHistoryEntry) -> Self {
        Self {
            id: e.id.to_string(),
            changed_at: e.changed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            old_role: or_dash(e.old_role_id),
            new_role: or_dash(e.new_role_id),
            old_department: or_dash(e.old_department_id),
            new_department: or_dash(e.new_department_id),
            changed_by: e.changed_by.to_string(),
        }
    }
}

/// Duplicate pair display row
#[derive(Debug, Serialize, Tabled)]
struct DuplicateRow {
    /// Earlier entry
    original: String,
    /// Repeated entry
    duplicate: String,
    /// Repeated at
    repeated_at: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Execute history commands
pub async fn execute(
    args: &HistoryArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, pool) = super::open_persistent_stores(&config).await?;
    let state = AppState::new(config, &stores);
    let ctx = RequestContext::operator();

    let result = match &args.command {
        HistoryCommand::List {
            user_id,
            page,
            page_size,
        } => state
            .auditor
            .history_for_user(&ctx, *user_id, PageRequest::new(*page, *page_size))
            .await
            .map(|page| {
                let rows: Vec<HistoryRow> = page.items.iter().map(HistoryRow::from).collect();
                output::print_list(&rows, format);
                if format == OutputFormat::Table {
                    println!(
                        "Page {} of {} ({} entries)",
                        page.page, page.total_pages, page.total_items
                    );
                }
            }),
        HistoryCommand::Duplicates { user_id } => state
            .auditor
            .find_duplicate_transitions(&ctx, *user_id)
            .await
            .map(|duplicates| {
                let rows: Vec<DuplicateRow> = duplicates
                    .iter()
                    .map(|d| DuplicateRow {
                        original: d.original.id.to_string(),
                        duplicate: d.duplicate.id.to_string(),
                        repeated_at: d
                            .duplicate
                            .changed_at
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string(),
                    })
                    .collect();
                output::print_list(&rows, format);
            }),
    };

    pool.close().await;
    result
}
