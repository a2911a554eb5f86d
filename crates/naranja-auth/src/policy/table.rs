//! Access-level to permission mapping.

use std::collections::{HashMap, HashSet};

use naranja_entity::user::AccessLevel;

use super::permission::Permission;

/// The static permission table.
///
/// Levels are independent sets. A level holds exactly the permissions
/// listed for it here; nothing is inherited from "lower" levels.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    policies: HashMap<AccessLevel, HashSet<Permission>>,
}

impl PermissionTable {
    /// Build the default table.
    pub fn new() -> Self {
        use Permission::*;

        let mut policies = HashMap::new();

        // Platform and tenant administrators: everything
        let everything: HashSet<Permission> = Permission::ALL.into_iter().collect();
        policies.insert(AccessLevel::SuperAdmin, everything.clone());
        policies.insert(AccessLevel::Admin, everything);

        // HR: people, structure, curricula
        policies.insert(
            AccessLevel::HrAdmin,
            HashSet::from([
                UsersChangeRole,
                RolesManageCurriculum,
                AssignmentsSync,
                AssignmentsAssignManual,
                DepartmentsManage,
                HistoryView,
                TrainingView,
                DocumentsView,
                IncidentsLog,
                ReportsView,
            ]),
        );

        // Health & safety: documents and incidents
        policies.insert(
            AccessLevel::HsAdmin,
            HashSet::from([
                TrainingView,
                DocumentsView,
                DocumentsManage,
                IncidentsLog,
                IncidentsManage,
                ReportsView,
            ]),
        );

        policies.insert(
            AccessLevel::DeptManager,
            HashSet::from([
                AssignmentsAssignManual,
                HistoryView,
                TrainingView,
                DocumentsView,
                IncidentsLog,
                ReportsView,
            ]),
        );

        policies.insert(
            AccessLevel::Manager,
            HashSet::from([TrainingView, DocumentsView, IncidentsLog, ReportsView]),
        );

        policies.insert(
            AccessLevel::Trainer,
            HashSet::from([
                AssignmentsAssignManual,
                TrainingView,
                TrainingManage,
                DocumentsView,
                IncidentsLog,
            ]),
        );

        policies.insert(
            AccessLevel::User,
            HashSet::from([TrainingView, DocumentsView, IncidentsLog]),
        );

        Self { policies }
    }

    /// Whether `level` holds `permission`.
    pub fn has_permission(&self, level: AccessLevel, permission: Permission) -> bool {
        self.policies
            .get(&level)
            .is_some_and(|perms| perms.contains(&permission))
    }

    /// Permissions held by `level`, sorted by key.
    pub fn permissions_for(&self, level: AccessLevel) -> Vec<Permission> {
        let mut perms: Vec<_> = self
            .policies
            .get(&level)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        perms.sort_by_key(|p| p.key());
        perms
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new()
    }
}
