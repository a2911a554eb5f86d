//! In-memory implementation of every store, for single-node development
//! and tests.
//!
//! All data sits behind one `RwLock`, so each trait call observes and
//! mutates a consistent state. Unique constraints of the Postgres schema
//! are enforced the same way here.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{
    AssignmentId, DepartmentId, HistoryEntryId, PageRequest, PageResponse, RoleId, UserId,
};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::department::{Department, NewDepartment};
use naranja_entity::history::{Placement, RoleChange, RoleChangeHistoryEntry};
use naranja_entity::requirement::{ItemKey, RequiredItem};
use naranja_entity::role::{NewRole, Role};
use naranja_entity::user::{NewUser, User};

use crate::store::{
    AssignmentStore, DepartmentStore, RequirementStore, RoleHistoryStore, RoleStore, SyncView,
    UserStore,
};

#[derive(Debug, Default)]
struct Data {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    departments: HashMap<DepartmentId, Department>,
    required: Vec<RequiredItem>,
    assignments: Vec<UserAssignment>,
    /// Append order is chronological order.
    history: Vec<RoleChangeHistoryEntry>,
}

impl Data {
    fn required_for(&self, role_id: RoleId) -> Vec<RequiredItem> {
        let mut items: Vec<_> = self
            .required
            .iter()
            .filter(|r| r.role_id == role_id)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.key());
        items
    }

    fn assignments_for(&self, user_id: UserId) -> Vec<UserAssignment> {
        let mut rows: Vec<_> = self
            .assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.key());
        rows
    }
}

/// Shared in-memory dataset implementing all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Data>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user's assignment completed at `at`.
    ///
    /// Returns `false` if the user holds no such assignment.
    pub async fn mark_completed(&self, user_id: UserId, key: ItemKey, at: DateTime<Utc>) -> bool {
        let mut data = self.data.write().await;
        match data
            .assignments
            .iter_mut()
            .find(|a| a.user_id == user_id && a.key() == key)
        {
            Some(row) => {
                row.completed_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Overwrite a user's placement without recording history.
    ///
    /// Models an out-of-band edit racing a role change.
    pub async fn force_placement(&self, user_id: UserId, placement: Placement) -> bool {
        let mut data = self.data.write().await;
        match data.users.get_mut(&user_id) {
            Some(user) => {
                user.role_id = placement.role_id;
                user.department_id = placement.department_id;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn find_by_auth_subject(&self, subject: &str) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .values()
            .find(|u| u.auth_subject == subject)
            .cloned())
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut data = self.data.write().await;
        if data.users.values().any(|u| u.auth_subject == new.auth_subject) {
            return Err(AppError::conflict(format!(
                "User with auth subject '{}' already exists",
                new.auth_subject
            )));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            auth_subject: new.auth_subject,
            full_name: new.full_name,
            email: new.email,
            role_id: new.role_id,
            department_id: new.department_id,
            location: new.location,
            access_level: new.access_level,
            created_at: now,
            updated_at: now,
        };
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_ids_by_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let data = self.data.read().await;
        let mut ids: Vec<_> = data
            .users
            .values()
            .filter(|u| u.role_id == Some(role_id))
            .map(|u| u.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.data.read().await.roles.get(&id).cloned())
    }

    async fn create(&self, new: NewRole) -> AppResult<Role> {
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            title: new.title,
            department_id: new.department_id,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_by_department(&self, department_id: DepartmentId) -> AppResult<Vec<Role>> {
        let data = self.data.read().await;
        let mut roles: Vec<_> = data
            .roles
            .values()
            .filter(|r| r.department_id == Some(department_id))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(roles)
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn find_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        Ok(self.data.read().await.departments.get(&id).cloned())
    }

    async fn create(&self, new: NewDepartment) -> AppResult<Department> {
        let now = Utc::now();
        let department = Department {
            id: DepartmentId::new(),
            name: new.name,
            parent_id: new.parent_id,
            created_at: now,
            updated_at: now,
        };
        self.data
            .write()
            .await
            .departments
            .insert(department.id, department.clone());
        Ok(department)
    }

    async fn find_all(&self) -> AppResult<Vec<Department>> {
        let data = self.data.read().await;
        let mut all: Vec<_> = data.departments.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn set_parent(
        &self,
        id: DepartmentId,
        parent_id: Option<DepartmentId>,
    ) -> AppResult<Department> {
        let mut data = self.data.write().await;
        let department = data
            .departments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))?;
        department.parent_id = parent_id;
        department.updated_at = Utc::now();
        Ok(department.clone())
    }
}

#[async_trait]
impl RequirementStore for MemoryStore {
    async fn items_for_role(&self, role_id: RoleId) -> AppResult<Vec<RequiredItem>> {
        Ok(self.data.read().await.required_for(role_id))
    }

    async fn items_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RequiredItem>> {
        let data = self.data.read().await;
        Ok(role_ids
            .iter()
            .flat_map(|id| data.required_for(*id))
            .collect())
    }

    async fn replace_for_role(
        &self,
        role_id: RoleId,
        items: &[ItemKey],
    ) -> AppResult<Vec<RequiredItem>> {
        let mut data = self.data.write().await;
        data.required.retain(|r| r.role_id != role_id);
        let now = Utc::now();
        for key in items {
            let exists = data
                .required
                .iter()
                .any(|r| r.role_id == role_id && r.key() == *key);
            if !exists {
                data.required.push(RequiredItem {
                    role_id,
                    item_id: key.item_id,
                    item_type: key.item_type,
                    created_at: now,
                });
            }
        }
        Ok(data.required_for(role_id))
    }

    async fn add(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool> {
        let mut data = self.data.write().await;
        if data
            .required
            .iter()
            .any(|r| r.role_id == role_id && r.key() == key)
        {
            return Ok(false);
        }
        data.required.push(RequiredItem {
            role_id,
            item_id: key.item_id,
            item_type: key.item_type,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool> {
        let mut data = self.data.write().await;
        let before = data.required.len();
        data.required
            .retain(|r| !(r.role_id == role_id && r.key() == key));
        Ok(data.required.len() < before)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn load_sync_view(&self, user_id: UserId) -> AppResult<Option<SyncView>> {
        let data = self.data.read().await;
        let Some(user) = data.users.get(&user_id).cloned() else {
            return Ok(None);
        };
        let role = user.role_id.and_then(|id| data.roles.get(&id).cloned());
        let required = user
            .role_id
            .map(|id| data.required_for(id))
            .unwrap_or_default();
        let assignments = data.assignments_for(user_id);
        Ok(Some(SyncView {
            user,
            role,
            required,
            assignments,
        }))
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserAssignment>> {
        Ok(self.data.read().await.assignments_for(user_id))
    }

    async fn insert_missing(&self, rows: &[NewAssignment]) -> AppResult<u64> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let mut inserted = 0;
        for row in rows {
            let held = data
                .assignments
                .iter()
                .any(|a| a.user_id == row.user_id && a.key() == row.key);
            if held {
                continue;
            }
            data.assignments.push(UserAssignment {
                id: AssignmentId::new(),
                user_id: row.user_id,
                item_id: row.key.item_id,
                item_type: row.key.item_type,
                source: row.source,
                source_role_id: row.source_role_id,
                assigned_at: now,
                completed_at: None,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn remove_role_derived(
        &self,
        user_id: UserId,
        keys: &[ItemKey],
        include_completed: bool,
    ) -> AppResult<u64> {
        let mut data = self.data.write().await;
        let before = data.assignments.len();
        data.assignments.retain(|a| {
            let removable = a.user_id == user_id
                && a.is_role_derived()
                && (include_completed || !a.is_completed())
                && keys.contains(&a.key());
            !removable
        });
        let removed = (before - data.assignments.len()) as u64;
        if removed > 0 {
            debug!(user_id = %user_id, removed, "Removed role-derived assignments");
        }
        Ok(removed)
    }
}

#[async_trait]
impl RoleHistoryStore for MemoryStore {
    async fn record_transition(&self, change: &RoleChange) -> AppResult<RoleChangeHistoryEntry> {
        let mut data = self.data.write().await;
        let user = data
            .users
            .get_mut(&change.user_id)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", change.user_id)))?;

        let current = Placement {
            role_id: user.role_id,
            department_id: user.department_id,
        };
        if current != change.from {
            return Err(AppError::conflict(format!(
                "User {} is no longer in the expected role/department",
                change.user_id
            )));
        }

        let now = Utc::now();
        user.role_id = change.to.role_id;
        user.department_id = change.to.department_id;
        user.updated_at = now;

        let entry = RoleChangeHistoryEntry {
            id: HistoryEntryId::new(),
            user_id: change.user_id,
            old_role_id: change.from.role_id,
            new_role_id: change.to.role_id,
            old_department_id: change.from.department_id,
            new_department_id: change.to.department_id,
            changed_by: change.changed_by,
            changed_at: now,
        };
        data.history.push(entry.clone());
        Ok(entry)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RoleChangeHistoryEntry>> {
        let data = self.data.read().await;
        let newest_first: Vec<_> = data
            .history
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        let total = newest_first.len() as u64;
        Ok(PageResponse::new(page.slice(&newest_first), page, total))
    }

    async fn all_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleChangeHistoryEntry>> {
        let data = self.data.read().await;
        Ok(data
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
