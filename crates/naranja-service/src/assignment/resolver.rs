//! Computes what members of a role or department must complete.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use naranja_auth::{AccessPolicy, Permission};
use naranja_core::config::SyncConfig;
use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, RoleId};
use naranja_database::{DepartmentStore, RequirementStore, RoleStore};
use naranja_entity::requirement::{ItemKey, RequiredItem};
use naranja_entity::role::Role;

use crate::context::RequestContext;
use crate::retry::with_retry;

/// A role's required set captured at one instant.
///
/// A batch sync uses one snapshot for every member, so curriculum edits
/// made while the batch runs apply on the next sync.
#[derive(Debug, Clone)]
pub struct RoleSnapshot {
    /// The role.
    pub role: Role,
    /// Its required items.
    pub items: BTreeSet<ItemKey>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

/// Resolves required-item sets from role curricula.
#[derive(Clone)]
pub struct AssignmentResolver {
    roles: Arc<dyn RoleStore>,
    departments: Arc<dyn DepartmentStore>,
    requirements: Arc<dyn RequirementStore>,
    policy: Arc<AccessPolicy>,
    config: SyncConfig,
}

impl std::fmt::Debug for AssignmentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentResolver").finish_non_exhaustive()
    }
}

impl AssignmentResolver {
    /// Creates a new resolver.
    pub fn new(
        roles: Arc<dyn RoleStore>,
        departments: Arc<dyn DepartmentStore>,
        requirements: Arc<dyn RequirementStore>,
        policy: Arc<AccessPolicy>,
        config: SyncConfig,
    ) -> Self {
        Self {
            roles,
            departments,
            requirements,
            policy,
            config,
        }
    }

    /// Every item a holder of `role_id` must complete.
    ///
    /// An empty set is valid. Fails with `NotFound` for an unknown role.
    pub async fn required_items_for_role(&self, role_id: RoleId) -> AppResult<BTreeSet<ItemKey>> {
        self.require_role(role_id).await?;
        let items = with_retry(&self.config, "load_required_items", || {
            self.requirements.items_for_role(role_id)
        })
        .await?;
        Ok(items.iter().map(RequiredItem::key).collect())
    }

    /// Union of the required items of every role owned by `department_id`.
    ///
    /// Fails with `NotFound` for an unknown department.
    pub async fn required_items_for_department(
        &self,
        department_id: DepartmentId,
    ) -> AppResult<BTreeSet<ItemKey>> {
        with_retry(&self.config, "load_department", || {
            self.departments.find_by_id(department_id)
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {department_id} not found")))?;

        let roles = with_retry(&self.config, "load_department_roles", || {
            self.roles.find_by_department(department_id)
        })
        .await?;
        let role_ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();

        let items = with_retry(&self.config, "load_required_items", || {
            self.requirements.items_for_roles(&role_ids)
        })
        .await?;
        Ok(items.iter().map(RequiredItem::key).collect())
    }

    /// Capture a role and its required set for a batch sync.
    pub async fn snapshot_for_role(&self, role_id: RoleId) -> AppResult<RoleSnapshot> {
        let role = self.require_role(role_id).await?;
        let items = with_retry(&self.config, "load_required_items", || {
            self.requirements.items_for_role(role_id)
        })
        .await?;
        Ok(RoleSnapshot {
            role,
            items: items.iter().map(RequiredItem::key).collect(),
            taken_at: Utc::now(),
        })
    }

    /// Replace a role's curriculum.
    ///
    /// Existing assignments are not touched; callers run a role sync
    /// afterwards.
    pub async fn replace_required_items(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        items: &[ItemKey],
    ) -> AppResult<BTreeSet<ItemKey>> {
        ctx.require(&self.policy, Permission::RolesManageCurriculum)?;
        self.require_role(role_id).await?;

        let stored = self.requirements.replace_for_role(role_id, items).await?;

        info!(
            role_id = %role_id,
            items = stored.len(),
            changed_by = %ctx.user_id,
            "Role curriculum replaced"
        );
        Ok(stored.iter().map(RequiredItem::key).collect())
    }

    /// Add one item to a role's curriculum. Returns `false` if already present.
    pub async fn add_required_item(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        key: ItemKey,
    ) -> AppResult<bool> {
        ctx.require(&self.policy, Permission::RolesManageCurriculum)?;
        self.require_role(role_id).await?;
        let added = self.requirements.add(role_id, key).await?;
        if added {
            info!(role_id = %role_id, item = %key, "Required item added");
        }
        Ok(added)
    }

    /// Remove one item from a role's curriculum. Returns `false` if absent.
    pub async fn remove_required_item(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        key: ItemKey,
    ) -> AppResult<bool> {
        ctx.require(&self.policy, Permission::RolesManageCurriculum)?;
        self.require_role(role_id).await?;
        let removed = self.requirements.remove(role_id, key).await?;
        if removed {
            info!(role_id = %role_id, item = %key, "Required item removed");
        }
        Ok(removed)
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        with_retry(&self.config, "load_role", || self.roles.find_by_id(role_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))
    }
}
