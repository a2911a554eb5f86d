//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use naranja_core::types::{DepartmentId, ItemId, RoleId, UserId};
use naranja_entity::requirement::{ItemKey, ItemType};

/// Body of `POST /api/sync-role`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncRoleRequest {
    /// The role whose holders are reconciled.
    pub role_id: RoleId,
    /// Override the configured pruning of completed obsolete rows.
    #[serde(default)]
    pub prune_completed: Option<bool>,
}

/// Body of `POST /api/sync-user`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncUserRequest {
    /// The user to reconcile.
    pub user_id: UserId,
    /// Override the configured pruning of completed obsolete rows.
    #[serde(default)]
    pub prune_completed: Option<bool>,
}

/// Body of `POST /api/update-user-role`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRoleRequest {
    /// The user being moved.
    pub user_id: UserId,
    /// The role to assign.
    pub new_role_id: RoleId,
    /// Target department; defaults to the role's department.
    #[serde(default)]
    pub new_department_id: Option<DepartmentId>,
    /// Who is making the change; must be the caller.
    pub changed_by: UserId,
    /// Override the configured completed-row pruning for the follow-up sync.
    #[serde(default)]
    pub prune_completed: Option<bool>,
}

/// One entry of a curriculum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequiredItemInput {
    /// Module, document, or behaviour ID.
    pub item_id: ItemId,
    /// Kind of item.
    pub item_type: ItemType,
}

impl From<RequiredItemInput> for ItemKey {
    fn from(input: RequiredItemInput) -> Self {
        ItemKey::new(input.item_id, input.item_type)
    }
}

/// Body of `PUT /api/roles/{id}/required-items`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplaceRequiredItemsRequest {
    /// The complete new curriculum.
    #[validate(length(max = 1000, message = "Too many required items"))]
    pub items: Vec<RequiredItemInput>,
    /// Override the configured pruning for the follow-up sync.
    #[serde(default)]
    pub prune_completed: Option<bool>,
}

impl ReplaceRequiredItemsRequest {
    /// Item keys in request order.
    pub fn keys(&self) -> Vec<ItemKey> {
        self.items.iter().copied().map(ItemKey::from).collect()
    }
}

/// Body of `POST /api/departments`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    /// Department name.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Parent department.
    #[serde(default)]
    pub parent_id: Option<DepartmentId>,
}

/// Body of `PUT /api/departments/{id}/parent`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveDepartmentRequest {
    /// New parent, or `null` for the top level.
    #[serde(default)]
    pub parent_id: Option<DepartmentId>,
}
