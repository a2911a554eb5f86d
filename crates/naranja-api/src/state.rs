//! Shared application state injected into all handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use naranja_auth::{AccessPolicy, JwtDecoder};
use naranja_core::config::AppConfig;
use naranja_database::{RoleStore, Stores, UserStore};
use naranja_service::{
    AssignmentResolver, AssignmentSynchronizer, DepartmentService, RoleChangeAuditor,
};

/// Application state shared across all request handlers.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────────
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────────
    /// Access-level policy.
    pub policy: Arc<AccessPolicy>,
    /// Caller token decoder.
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Stores ───────────────────────────────────────────────────
    /// User lookups (caller resolution, role change preconditions).
    pub users: Arc<dyn UserStore>,
    /// Role lookups.
    pub roles: Arc<dyn RoleStore>,

    // ── Services ─────────────────────────────────────────────────
    /// Required item resolution and curriculum edits.
    pub resolver: Arc<AssignmentResolver>,
    /// Assignment reconciliation.
    pub synchronizer: Arc<AssignmentSynchronizer>,
    /// Role changes and history.
    pub auditor: Arc<RoleChangeAuditor>,
    /// Department tree.
    pub department_service: Arc<DepartmentService>,

    // ── Lifecycle ────────────────────────────────────────────────
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire every service over `stores`.
    pub fn new(config: AppConfig, stores: &Stores) -> Self {
        let policy = Arc::new(AccessPolicy::new());
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let sync_config = config.sync.clone();

        let resolver = Arc::new(AssignmentResolver::new(
            stores.roles.clone(),
            stores.departments.clone(),
            stores.requirements.clone(),
            Arc::clone(&policy),
            sync_config.clone(),
        ));
        let synchronizer = Arc::new(AssignmentSynchronizer::new(
            stores.users.clone(),
            stores.assignments.clone(),
            Arc::clone(&resolver),
            Arc::clone(&policy),
            sync_config.clone(),
        ));
        let auditor = Arc::new(RoleChangeAuditor::new(
            stores.users.clone(),
            stores.roles.clone(),
            stores.departments.clone(),
            stores.history.clone(),
            Arc::clone(&synchronizer),
            Arc::clone(&policy),
            sync_config.clone(),
        ));
        let department_service = Arc::new(DepartmentService::new(
            stores.departments.clone(),
            Arc::clone(&policy),
            sync_config,
        ));

        Self {
            config: Arc::new(config),
            policy,
            jwt_decoder,
            users: stores.users.clone(),
            roles: stores.roles.clone(),
            resolver,
            synchronizer,
            auditor,
            department_service,
            shutdown: CancellationToken::new(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
