//! The access policy facade used by handlers and the CLI.

use naranja_core::error::AppError;
use naranja_entity::user::AccessLevel;

use super::permission::Permission;
use super::routes::guard_for;
use super::table::PermissionTable;

/// Decides whether an access level may open a route or perform an action.
///
/// All checks are pure. A missing level (unauthenticated caller) is denied
/// everything.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    table: PermissionTable,
}

impl AccessPolicy {
    /// Create a policy over the default permission table.
    pub fn new() -> Self {
        Self {
            table: PermissionTable::new(),
        }
    }

    /// Whether `user_level` is one of `required_levels`.
    ///
    /// Both sides are parsed case-insensitively from display or storage
    /// names. Unparseable entries in `required_levels` never match. There
    /// is no hierarchy: "Super Admin" does not open a route that lists only
    /// "Trainer".
    pub fn check_route_access(&self, user_level: Option<&str>, required_levels: &[&str]) -> bool {
        let Some(level) = user_level.and_then(|s| s.parse::<AccessLevel>().ok()) else {
            return false;
        };
        required_levels
            .iter()
            .filter_map(|s| s.parse::<AccessLevel>().ok())
            .any(|allowed| allowed == level)
    }

    /// Typed form of [`check_route_access`](Self::check_route_access).
    pub fn level_allowed(&self, user_level: Option<AccessLevel>, allowed: &[AccessLevel]) -> bool {
        user_level.is_some_and(|level| allowed.contains(&level))
    }

    /// Whether `user_level` may open the admin UI route at `path`.
    ///
    /// Routes missing from the guard table are denied.
    pub fn check_route(&self, user_level: Option<AccessLevel>, path: &str) -> bool {
        match guard_for(path) {
            Some(guard) => self.level_allowed(user_level, guard.allowed),
            None => false,
        }
    }

    /// Whether `user_level` holds the permission named `permission_key`.
    ///
    /// Unknown keys are denied.
    pub fn check_permission(&self, user_level: Option<AccessLevel>, permission_key: &str) -> bool {
        match permission_key.parse::<Permission>() {
            Ok(permission) => self.has_permission(user_level, permission),
            Err(_) => false,
        }
    }

    /// Typed form of [`check_permission`](Self::check_permission).
    pub fn has_permission(&self, user_level: Option<AccessLevel>, permission: Permission) -> bool {
        user_level.is_some_and(|level| self.table.has_permission(level, permission))
    }

    /// Like [`has_permission`](Self::has_permission), but returns an
    /// `Authorization` error when denied.
    pub fn require(&self, user_level: AccessLevel, permission: Permission) -> Result<(), AppError> {
        if self.table.has_permission(user_level, permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Access level '{user_level}' does not have permission '{permission}'"
            )))
        }
    }

    /// Permissions held by `level`, sorted by key.
    pub fn capabilities(&self, level: AccessLevel) -> Vec<Permission> {
        self.table.permissions_for(level)
    }
}
