//! Access policy inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use naranja_auth::AccessPolicy;
use naranja_core::error::AppError;
use naranja_entity::user::AccessLevel;

use crate::output::{self, OutputFormat};

/// Arguments for access commands
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Access subcommand
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Check whether a level may open an admin UI route
    Check {
        /// Access level, e.g. "HR Admin" or hr_admin
        level: AccessLevel,
        /// Route path, e.g. /admin/users
        route: String,
    },
    /// List the permissions a level holds
    Capabilities {
        /// Access level
        level: AccessLevel,
    },
}

/// Permission display row
#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    /// Permission key
    permission: String,
}

/// Execute access commands
pub fn execute(args: &AccessArgs, format: OutputFormat) -> Result<(), AppError> {
    let policy = AccessPolicy::new();

    match &args.command {
        AccessCommand::Check { level, route } => {
            let allowed = policy.check_route(Some(*level), route);
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "level": level,
                    "route": route,
                    "allowed": allowed,
                })),
                OutputFormat::Table if allowed => output::print_success(&format!(
                    "{} may open {route}",
                    level.display_name()
                )),
                OutputFormat::Table => output::print_warning(&format!(
                    "{} may not open {route}",
                    level.display_name()
                )),
            }
        }
        AccessCommand::Capabilities { level } => {
            let rows: Vec<PermissionRow> = policy
                .capabilities(*level)
                .into_iter()
                .map(|p| PermissionRow {
                    permission: p.key().to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
