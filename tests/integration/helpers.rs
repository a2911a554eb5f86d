//! Shared test helpers for integration tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use naranja_api::{AppState, build_app};
use naranja_auth::Claims;
use naranja_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, StoreProvider, SyncConfig,
};
use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, ItemId, RoleId, UserId};
use naranja_database::{AssignmentStore, MemoryStore, Stores, SyncView, UserStore};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::department::{Department, NewDepartment};
use naranja_entity::history::Placement;
use naranja_entity::requirement::{ItemKey, ItemType};
use naranja_entity::role::{NewRole, Role};
use naranja_entity::user::{AccessLevel, NewUser, User};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Response status and parsed JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application over an in-memory store
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct access to the backing data
    pub store: Arc<MemoryStore>,
    /// The stores the app was wired with
    pub stores: Stores,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::memory(store.clone());
        Self::with_stores(store, stores)
    }

    /// Wire the app over `stores`, keeping `store` for seeding.
    pub fn with_stores(store: Arc<MemoryStore>, stores: Stores) -> Self {
        let state = AppState::new(test_config(), &stores);
        Self {
            router: build_app(state),
            store,
            stores,
        }
    }

    /// Rebuild the app with a different assignment store.
    pub fn with_assignments(self, assignments: Arc<dyn AssignmentStore>) -> Self {
        let stores = Stores {
            assignments,
            ..self.stores
        };
        Self::with_stores(self.store, stores)
    }

    /// Rebuild the app with a different user store.
    pub fn with_users(self, users: Arc<dyn UserStore>) -> Self {
        let stores = Stores {
            users,
            ..self.stores
        };
        Self::with_stores(self.store, stores)
    }

    /// Send a request and parse the JSON response body
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
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
        access_level: AccessLevel,
        role_id: Option<RoleId>,
        department_id: Option<DepartmentId>,
    ) -> User {
        self.stores
            .users
            .create(NewUser {
                auth_subject: format!("auth0|{}", UserId::new()),
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

    /// A registered caller at `level` and a token for them.
    pub async fn caller(&self, level: AccessLevel) -> (User, String) {
        let user = self.user(level, None, None).await;
        let token = token_for(&user.auth_subject);
        (user, token)
    }

    pub async fn held_keys(&self, user_id: UserId) -> Vec<ItemKey> {
        let mut keys: Vec<ItemKey> = self
            .stores
            .assignments
            .list_for_user(user_id)
            .await
            .unwrap()
            .iter()
            .map(UserAssignment::key)
            .collect();
        keys.sort();
        keys
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            provider: StoreProvider::Memory,
            ..DatabaseConfig::default()
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            ..AuthConfig::default()
        },
        sync: SyncConfig {
            retry_backoff_ms: 1,
            ..SyncConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

/// Mint an HS256 token for `subject`, valid for an hour.
pub fn token_for(subject: &str) -> String {
    token_expiring(subject, chrono::Utc::now().timestamp() + 3600)
}

/// Mint an HS256 token for `subject` expiring at `exp`.
pub fn token_expiring(subject: &str, exp: i64) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        exp,
        iat: Some(chrono::Utc::now().timestamp()),
        aud: None,
        email: None,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Assignment store whose snapshot reads always time out for chosen users.
pub struct UnreachableFor {
    inner: Arc<MemoryStore>,
    users: Mutex<HashSet<UserId>>,
}

impl UnreachableFor {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            users: Mutex::new(HashSet::new()),
        }
    }

    pub async fn block(&self, user_id: UserId) {
        self.users.lock().await.insert(user_id);
    }
}

#[async_trait]
impl AssignmentStore for UnreachableFor {
    async fn load_sync_view(&self, user_id: UserId) -> AppResult<Option<SyncView>> {
        if self.users.lock().await.contains(&user_id) {
            return Err(AppError::transient("connection pool timed out"));
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

/// User store that reports a stale placement for one user.
///
/// Models a second admin moving the user between our read and our write.
pub struct StaleUser {
    inner: Arc<MemoryStore>,
    user_id: UserId,
    reported: Placement,
}

impl StaleUser {
    pub fn new(inner: Arc<MemoryStore>, user_id: UserId, reported: Placement) -> Self {
        Self {
            inner,
            user_id,
            reported,
        }
    }
}

#[async_trait]
impl UserStore for StaleUser {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let user = UserStore::find_by_id(self.inner.as_ref(), id).await?;
        Ok(user.map(|mut u| {
            if u.id == self.user_id {
                u.role_id = self.reported.role_id;
                u.department_id = self.reported.department_id;
            }
            u
        }))
    }

    async fn find_by_auth_subject(&self, subject: &str) -> AppResult<Option<User>> {
        self.inner.find_by_auth_subject(subject).await
    }

    async fn create(&self, data: NewUser) -> AppResult<User> {
        UserStore::create(self.inner.as_ref(), data).await
    }

    async fn list_ids_by_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        self.inner.list_ids_by_role(role_id).await
    }
}
