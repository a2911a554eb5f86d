//! Role change history entry and the change request it records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use naranja_core::types::{DepartmentId, HistoryEntryId, RoleId, UserId};

/// An immutable record of one role/department transition.
///
/// Rows are append-only; the database rejects updates and deletes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleChangeHistoryEntry {
    /// Unique entry identifier.
    pub id: HistoryEntryId,
    /// The user whose placement changed.
    pub user_id: UserId,
    /// Role held before the change.
    pub old_role_id: Option<RoleId>,
    /// Role held after the change.
    pub new_role_id: Option<RoleId>,
    /// Department before the change.
    pub old_department_id: Option<DepartmentId>,
    /// Department after the change.
    pub new_department_id: Option<DepartmentId>,
    /// Who made the change.
    pub changed_by: UserId,
    /// When the change was recorded.
    pub changed_at: DateTime<Utc>,
}

impl RoleChangeHistoryEntry {
    /// Whether two entries describe the same transition for the same user.
    pub fn same_transition(&self, other: &Self) -> bool {
        self.user_id == other.user_id
            && self.old_role_id == other.old_role_id
            && self.new_role_id == other.new_role_id
            && self.old_department_id == other.old_department_id
            && self.new_department_id == other.new_department_id
    }
}

/// A user's role and department at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Role held.
    pub role_id: Option<RoleId>,
    /// Department.
    pub department_id: Option<DepartmentId>,
}

/// A requested transition of a user's placement.
///
/// `from` is the placement the caller believes is current; the store only
/// applies the change if that still holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    /// The user being moved.
    pub user_id: UserId,
    /// Expected current placement.
    pub from: Placement,
    /// Placement after the change.
    pub to: Placement,
    /// Who is making the change.
    pub changed_by: UserId,
}

impl RoleChange {
    /// Whether the change actually moves the user.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_when_placements_equal() {
        let role = Some(RoleId::new());
        let dept = Some(DepartmentId::new());
        let placement = Placement {
            role_id: role,
            department_id: dept,
        };
        let change = RoleChange {
            user_id: UserId::new(),
            from: placement,
            to: placement,
            changed_by: UserId::new(),
        };
        assert!(change.is_noop());
    }

    #[test]
    fn test_department_only_change_is_not_noop() {
        let role = Some(RoleId::new());
        let change = RoleChange {
            user_id: UserId::new(),
            from: Placement {
                role_id: role,
                department_id: Some(DepartmentId::new()),
            },
            to: Placement {
                role_id: role,
                department_id: Some(DepartmentId::new()),
            },
            changed_by: UserId::new(),
        };
        assert!(!change.is_noop());
    }
}
