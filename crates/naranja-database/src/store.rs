//! Store traits the services depend on.
//!
//! Each trait has a Postgres implementation under [`crate::repositories`]
//! and an in-memory one in [`crate::memory`]. [`Stores`] bundles one of
//! each for wiring.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, PageRequest, PageResponse, RoleId, UserId};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::department::{Department, NewDepartment};
use naranja_entity::history::{RoleChange, RoleChangeHistoryEntry};
use naranja_entity::requirement::{ItemKey, RequiredItem};
use naranja_entity::role::{NewRole, Role};
use naranja_entity::user::{NewUser, User};

use crate::memory::MemoryStore;
use crate::repositories::{
    AssignmentRepository, DepartmentRepository, RequirementRepository, RoleHistoryRepository,
    RoleRepository, UserRepository,
};

/// Everything one user's synchronization reads, taken from a single
/// consistent snapshot.
#[derive(Debug, Clone)]
pub struct SyncView {
    /// The user being synchronized.
    pub user: User,
    /// The user's role, or `None` when the user has no role or the
    /// referenced role no longer exists.
    pub role: Option<Role>,
    /// Required items of `role`.
    pub required: Vec<RequiredItem>,
    /// Every assignment row the user holds, of any source.
    pub assignments: Vec<UserAssignment>,
}

/// User lookups.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by identity provider subject.
    async fn find_by_auth_subject(&self, subject: &str) -> AppResult<Option<User>>;

    /// Register a user.
    async fn create(&self, data: NewUser) -> AppResult<User>;

    /// IDs of every user currently holding `role_id`.
    async fn list_ids_by_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>>;
}

/// Role lookups.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Find a role by primary key.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Create a role.
    async fn create(&self, data: NewRole) -> AppResult<Role>;

    /// Roles owned by a department.
    async fn find_by_department(&self, department_id: DepartmentId) -> AppResult<Vec<Role>>;
}

/// Department tree persistence.
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Find a department by primary key.
    async fn find_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>>;

    /// Create a department.
    async fn create(&self, data: NewDepartment) -> AppResult<Department>;

    /// Every department, for walking the parent chain.
    async fn find_all(&self) -> AppResult<Vec<Department>>;

    /// Change a department's parent.
    async fn set_parent(
        &self,
        id: DepartmentId,
        parent_id: Option<DepartmentId>,
    ) -> AppResult<Department>;
}

/// Role curriculum persistence.
#[async_trait]
pub trait RequirementStore: Send + Sync {
    /// Required items of one role.
    async fn items_for_role(&self, role_id: RoleId) -> AppResult<Vec<RequiredItem>>;

    /// Required items of several roles.
    async fn items_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RequiredItem>>;

    /// Replace a role's curriculum with `items` in one step.
    async fn replace_for_role(
        &self,
        role_id: RoleId,
        items: &[ItemKey],
    ) -> AppResult<Vec<RequiredItem>>;

    /// Add one item; returns `false` if it was already required.
    async fn add(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool>;

    /// Remove one item; returns `false` if it was not required.
    async fn remove(&self, role_id: RoleId, key: ItemKey) -> AppResult<bool>;
}

/// Assignment row persistence.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Read a user's sync inputs from one consistent snapshot.
    ///
    /// Returns `None` when the user does not exist.
    async fn load_sync_view(&self, user_id: UserId) -> AppResult<Option<SyncView>>;

    /// Every assignment the user holds.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserAssignment>>;

    /// Insert rows, silently skipping any `(user, item, type)` already held.
    ///
    /// Returns the number of rows actually inserted.
    async fn insert_missing(&self, rows: &[NewAssignment]) -> AppResult<u64>;

    /// Delete role-derived rows for `keys`.
    ///
    /// Manual rows are never touched. Completed rows are only deleted when
    /// `include_completed` is set. Returns the number of rows deleted.
    async fn remove_role_derived(
        &self,
        user_id: UserId,
        keys: &[ItemKey],
        include_completed: bool,
    ) -> AppResult<u64>;
}

/// Role change history persistence.
#[async_trait]
pub trait RoleHistoryStore: Send + Sync {
    /// Apply `change` to the user and append its history entry atomically.
    ///
    /// Fails with `Conflict` if the user's current placement no longer
    /// equals `change.from`, and with `NotFound` if the user is missing.
    async fn record_transition(&self, change: &RoleChange) -> AppResult<RoleChangeHistoryEntry>;

    /// Entries for a user, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RoleChangeHistoryEntry>>;

    /// Every entry for a user, oldest first.
    async fn all_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleChangeHistoryEntry>>;
}

/// One implementation of every store, shared behind `Arc`s.
#[derive(Clone)]
pub struct Stores {
    /// Users.
    pub users: Arc<dyn UserStore>,
    /// Roles.
    pub roles: Arc<dyn RoleStore>,
    /// Departments.
    pub departments: Arc<dyn DepartmentStore>,
    /// Role curricula.
    pub requirements: Arc<dyn RequirementStore>,
    /// Assignment rows.
    pub assignments: Arc<dyn AssignmentStore>,
    /// Role change history.
    pub history: Arc<dyn RoleHistoryStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            departments: Arc::new(DepartmentRepository::new(pool.clone())),
            requirements: Arc::new(RequirementRepository::new(pool.clone())),
            assignments: Arc::new(AssignmentRepository::new(pool.clone())),
            history: Arc::new(RoleHistoryRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory dataset.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            roles: store.clone(),
            departments: store.clone(),
            requirements: store.clone(),
            assignments: store.clone(),
            history: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
