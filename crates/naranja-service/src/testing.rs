//! Shared fixtures for service tests.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use naranja_auth::AccessPolicy;
use naranja_core::config::SyncConfig;
use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, ItemId, PageRequest, PageResponse, RoleId, UserId};
use naranja_database::{AssignmentStore, MemoryStore, RoleHistoryStore, Stores, SyncView};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::department::{Department, NewDepartment};
use naranja_entity::history::{RoleChange, RoleChangeHistoryEntry};
use naranja_entity::requirement::{ItemKey, ItemType};
use naranja_entity::role::{NewRole, Role};
use naranja_entity::user::{AccessLevel, NewUser, User};

use crate::assignment::{AssignmentResolver, AssignmentSynchronizer};
use crate::context::RequestContext;
use crate::department::DepartmentService;
use crate::history::RoleChangeAuditor;

/// Services wired over one in-memory store.
pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub stores: Stores,
    pub resolver: Arc<AssignmentResolver>,
    pub synchronizer: Arc<AssignmentSynchronizer>,
    pub auditor: Arc<RoleChangeAuditor>,
    pub departments: DepartmentService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), Stores::memory(store))
    }

    /// Rebuild the services with a different assignment store.
    pub fn with_assignments(self, assignments: Arc<dyn AssignmentStore>) -> Self {
        let stores = Stores {
            assignments,
            ..self.stores
        };
        Self::build(self.store, stores)
    }

    /// Rebuild the services with a different history store.
    pub fn with_history(self, history: Arc<dyn RoleHistoryStore>) -> Self {
        let stores = Stores {
            history,
            ..self.stores
        };
        Self::build(self.store, stores)
    }

    fn build(store: Arc<MemoryStore>, stores: Stores) -> Self {
        let config = SyncConfig {
            retry_backoff_ms: 1,
            ..SyncConfig::default()
        };
        let policy = Arc::new(AccessPolicy::new());
        let resolver = Arc::new(AssignmentResolver::new(
            stores.roles.clone(),
            stores.departments.clone(),
            stores.requirements.clone(),
            policy.clone(),
            config.clone(),
        ));
        let synchronizer = Arc::new(AssignmentSynchronizer::new(
            stores.users.clone(),
            stores.assignments.clone(),
            resolver.clone(),
            policy.clone(),
            config.clone(),
        ));
        let auditor = Arc::new(RoleChangeAuditor::new(
            stores.users.clone(),
            stores.roles.clone(),
            stores.departments.clone(),
            stores.history.clone(),
            synchronizer.clone(),
            policy.clone(),
            config.clone(),
        ));
        let departments = DepartmentService::new(stores.departments.clone(), policy, config);
        Self {
            store,
            stores,
            resolver,
            synchronizer,
            auditor,
            departments,
        }
    }

    pub async fn department(&self, name: &str, parent_id: Option<DepartmentId>) -> Department {
        self.stores
            .departments
            .create(NewDepartment {
                name: name.to_string(),
                parent_id,
            })
            .await
            .unwrap()
    }

    pub async fn role(&self, title: &str, department_id: Option<DepartmentId>) -> Role {
        self.stores
            .roles
            .create(NewRole {
                title: title.to_string(),
                department_id,
            })
            .await
            .unwrap()
    }

    /// Add a fresh item of `item_type` to the role's curriculum.
    pub async fn require(&self, role_id: RoleId, item_type: ItemType) -> ItemKey {
        let key = ItemKey::new(ItemId::new(), item_type);
        self.stores.requirements.add(role_id, key).await.unwrap();
        key
    }

    pub async fn user(
        &self,
        role_id: Option<RoleId>,
        department_id: Option<DepartmentId>,
    ) -> User {
        self.user_with_level(role_id, department_id, AccessLevel::User)
            .await
    }

    async fn user_with_level(
        &self,
        role_id: Option<RoleId>,
        department_id: Option<DepartmentId>,
        access_level: AccessLevel,
    ) -> User {
        let subject = format!("auth|{}", UserId::new());
        self.stores
            .users
            .create(NewUser {
                auth_subject: subject,
                full_name: "Test Person".to_string(),
                email: None,
                role_id,
                department_id,
                location: None,
                access_level,
            })
            .await
            .unwrap()
    }

    /// A caller context for a new user at `level`.
    pub async fn ctx(&self, level: AccessLevel) -> RequestContext {
        let caller = self.user_with_level(None, None, level).await;
        RequestContext::for_user(&caller, "127.0.0.1".to_string(), None)
    }

    pub async fn held_keys(&self, user_id: UserId) -> BTreeSet<ItemKey> {
        self.stores
            .assignments
            .list_for_user(user_id)
            .await
            .unwrap()
            .iter()
            .map(UserAssignment::key)
            .collect()
    }
}

/// Assignment store that injects transient failures.
pub(crate) struct FlakyAssignments {
    inner: Arc<MemoryStore>,
    failing_users: Mutex<HashSet<UserId>>,
    fail_loads: AtomicU32,
    load_attempts: AtomicU32,
}

impl FlakyAssignments {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failing_users: Mutex::new(HashSet::new()),
            fail_loads: AtomicU32::new(0),
            load_attempts: AtomicU32::new(0),
        }
    }

    /// Every snapshot read for `user_id` times out.
    pub async fn fail_user_permanently(&self, user_id: UserId) {
        self.failing_users.lock().await.insert(user_id);
    }

    /// The next `n` snapshot reads time out.
    pub fn fail_next_loads(&self, n: u32) {
        self.fail_loads.store(n, Ordering::SeqCst);
    }

    pub fn load_attempts(&self) -> u32 {
        self.load_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssignmentStore for FlakyAssignments {
    async fn load_sync_view(&self, user_id: UserId) -> AppResult<Option<SyncView>> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.lock().await.contains(&user_id) {
            return Err(AppError::transient("connection pool timed out"));
        }
        let remaining = self.fail_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::transient("connection reset"));
        }
        self.inner.load_sync_view(user_id).await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<UserAssignment>> {
        AssignmentStore::list_for_user(self.inner.as_ref(), user_id).await
    }

    async fn insert_missing(&self, rows: &[NewAssignment]) -> AppResult<u64> {
        self.inner.insert_missing(rows).await
    }

    async fn remove_role_derived(
        &self,
        user_id: UserId,
        keys: &[ItemKey],
        include_completed: bool,
    ) -> AppResult<u64> {
        self.inner
            .remove_role_derived(user_id, keys, include_completed)
            .await
    }
}

/// History store whose next transition write reports a timeout.
pub(crate) struct TimeoutOnWrite {
    inner: Arc<MemoryStore>,
    commit_before_failing: bool,
    armed: AtomicBool,
    writes: AtomicU32,
}

impl TimeoutOnWrite {
    /// The next write commits, then reports a timeout.
    pub fn after_commit(inner: Arc<MemoryStore>) -> Self {
        Self::new(inner, true)
    }

    /// The next write times out without committing.
    pub fn before_commit(inner: Arc<MemoryStore>) -> Self {
        Self::new(inner, false)
    }

    fn new(inner: Arc<MemoryStore>, commit_before_failing: bool) -> Self {
        Self {
            inner,
            commit_before_failing,
            armed: AtomicBool::new(true),
            writes: AtomicU32::new(0),
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleHistoryStore for TimeoutOnWrite {
    async fn record_transition(&self, change: &RoleChange) -> AppResult<RoleChangeHistoryEntry> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.armed.swap(false, Ordering::SeqCst) {
            if self.commit_before_failing {
                self.inner.record_transition(change).await?;
            }
            return Err(AppError::transient("connection reset before acknowledgement"));
        }
        self.inner.record_transition(change).await
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RoleChangeHistoryEntry>> {
        RoleHistoryStore::list_for_user(self.inner.as_ref(), user_id, page).await
    }

    async fn all_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleChangeHistoryEntry>> {
        self.inner.all_for_user(user_id).await
    }
}
