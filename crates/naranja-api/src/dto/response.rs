//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use naranja_auth::Permission;
use naranja_core::types::{
    DepartmentId, HistoryEntryId, ItemId, PageResponse, RoleId, UserId,
};
use naranja_entity::department::Department;
use naranja_entity::history::RoleChangeHistoryEntry;
use naranja_entity::requirement::{ItemKey, ItemType};
use naranja_entity::user::AccessLevel;
use naranja_service::{BatchReport, DuplicateTransition, SyncOutcome};

use crate::error::ApiErrorResponse;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when the server is up.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// What the caller may do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    /// The caller.
    pub user_id: UserId,
    /// Storage name of the caller's level.
    pub access_level: AccessLevel,
    /// Display name of the caller's level.
    pub access_level_name: String,
    /// Permissions held, sorted by key.
    pub permissions: Vec<Permission>,
    /// Admin UI routes the caller may open.
    pub routes: Vec<String>,
}

/// One required item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredItemResponse {
    /// Module, document, or behaviour ID.
    pub item_id: ItemId,
    /// Kind of item.
    pub item_type: ItemType,
}

impl From<ItemKey> for RequiredItemResponse {
    fn from(key: ItemKey) -> Self {
        Self {
            item_id: key.item_id,
            item_type: key.item_type,
        }
    }
}

/// Items a role requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleItemsResponse {
    /// The role.
    pub role_id: RoleId,
    /// Required items, ordered by type then ID.
    pub items: Vec<RequiredItemResponse>,
}

/// Items any role of a department requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentItemsResponse {
    /// The department.
    pub department_id: DepartmentId,
    /// Union of the required items of its roles.
    pub items: Vec<RequiredItemResponse>,
}

/// Result of replacing a curriculum and resyncing its holders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumUpdateResponse {
    /// The role.
    pub role_id: RoleId,
    /// The stored curriculum.
    pub items: Vec<RequiredItemResponse>,
    /// The follow-up role sync.
    pub sync: BatchReport,
}

/// Result of a role change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeResponse {
    /// The history entry written; `null` when nothing changed.
    pub history_entry_id: Option<HistoryEntryId>,
    /// The follow-up sync, when it succeeded.
    pub sync_result: Option<SyncOutcome>,
    /// Why the follow-up sync failed; the user needs a resync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<ApiErrorResponse>,
}

/// A department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    /// Department ID.
    pub id: DepartmentId,
    /// Name.
    pub name: String,
    /// Parent department.
    pub parent_id: Option<DepartmentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            parent_id: d.parent_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// One role change history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    /// Entry ID.
    pub id: HistoryEntryId,
    /// The user moved.
    pub user_id: UserId,
    /// Role before.
    pub old_role_id: Option<RoleId>,
    /// Role after.
    pub new_role_id: Option<RoleId>,
    /// Department before.
    pub old_department_id: Option<DepartmentId>,
    /// Department after.
    pub new_department_id: Option<DepartmentId>,
    /// Who made the change.
    pub changed_by: UserId,
    /// When.
    pub changed_at: DateTime<Utc>,
}

impl From<RoleChangeHistoryEntry> for HistoryEntryResponse {
    fn from(e: RoleChangeHistoryEntry) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            old_role_id: e.old_role_id,
            new_role_id: e.new_role_id,
            old_department_id: e.old_department_id,
            new_department_id: e.new_department_id,
            changed_by: e.changed_by,
            changed_at: e.changed_at,
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Current page.
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
    /// Total item count.
    pub total_items: u64,
    /// Total pages.
    pub total_pages: u64,
}

impl<S, T> From<PageResponse<S>> for PaginatedResponse<T>
where
    S: Serialize,
    T: From<S>,
{
    fn from(page: PageResponse<S>) -> Self {
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }
}

/// Two consecutive history entries recording the same transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTransitionResponse {
    /// The earlier entry.
    pub original: HistoryEntryResponse,
    /// The later, repeated entry.
    pub duplicate: HistoryEntryResponse,
}

impl From<DuplicateTransition> for DuplicateTransitionResponse {
    fn from(d: DuplicateTransition) -> Self {
        Self {
            original: d.original.into(),
            duplicate: d.duplicate.into(),
        }
    }
}
