//! Action-level permissions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use naranja_core::error::AppError;

/// An action the admin UI or API may gate on.
///
/// Each variant has a stable dotted key used in the permission table and
/// in `checkPermission` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    // People and structure
    /// Change a user's role or department.
    #[serde(rename = "users.change_role")]
    UsersChangeRole,
    /// Edit the required items of a role.
    #[serde(rename = "roles.manage_curriculum")]
    RolesManageCurriculum,
    /// Trigger assignment synchronization.
    #[serde(rename = "assignments.sync")]
    AssignmentsSync,
    /// Assign an item to a user by hand.
    #[serde(rename = "assignments.assign_manual")]
    AssignmentsAssignManual,
    /// Create and move departments.
    #[serde(rename = "departments.manage")]
    DepartmentsManage,
    /// Read role change history.
    #[serde(rename = "history.view")]
    HistoryView,

    // Compliance content
    /// See training modules.
    #[serde(rename = "training.view")]
    TrainingView,
    /// Author and sign off training.
    #[serde(rename = "training.manage")]
    TrainingManage,
    /// See policy documents.
    #[serde(rename = "documents.view")]
    DocumentsView,
    /// Publish and retire documents.
    #[serde(rename = "documents.manage")]
    DocumentsManage,
    /// Log an incident.
    #[serde(rename = "incidents.log")]
    IncidentsLog,
    /// Investigate and close incidents.
    #[serde(rename = "incidents.manage")]
    IncidentsManage,

    // Oversight
    /// See compliance reports.
    #[serde(rename = "reports.view")]
    ReportsView,
    /// See the audit trail.
    #[serde(rename = "audit.view")]
    AuditView,
}

impl Permission {
    /// Every permission, in key order.
    pub const ALL: [Permission; 14] = [
        Self::UsersChangeRole,
        Self::RolesManageCurriculum,
        Self::AssignmentsSync,
        Self::AssignmentsAssignManual,
        Self::DepartmentsManage,
        Self::HistoryView,
        Self::TrainingView,
        Self::TrainingManage,
        Self::DocumentsView,
        Self::DocumentsManage,
        Self::IncidentsLog,
        Self::IncidentsManage,
        Self::ReportsView,
        Self::AuditView,
    ];

    /// The stable dotted key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::UsersChangeRole => "users.change_role",
            Self::RolesManageCurriculum => "roles.manage_curriculum",
            Self::AssignmentsSync => "assignments.sync",
            Self::AssignmentsAssignManual => "assignments.assign_manual",
            Self::DepartmentsManage => "departments.manage",
            Self::HistoryView => "history.view",
            Self::TrainingView => "training.view",
            Self::TrainingManage => "training.manage",
            Self::DocumentsView => "documents.view",
            Self::DocumentsManage => "documents.manage",
            Self::IncidentsLog => "incidents.log",
            Self::IncidentsManage => "incidents.manage",
            Self::ReportsView => "reports.view",
            Self::AuditView => "audit.view",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| AppError::validation(format!("Unknown permission key: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for permission in Permission::ALL {
            assert_eq!(permission.key().parse::<Permission>().unwrap(), permission);
        }
    }

    #[test]
    fn test_serde_matches_key() {
        for permission in Permission::ALL {
            let json = serde_json::to_string(&permission).unwrap();
            assert_eq!(json, format!("\"{}\"", permission.key()));
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!("users.delete".parse::<Permission>().is_err());
    }
}
