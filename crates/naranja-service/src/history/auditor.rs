//! Records role/department transitions and triggers the follow-up sync.
//!
//! This is the only write path for a user's placement. The history row and
//! the user update commit together; the sync runs afterwards and its
//! failure never rolls the history back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use naranja_auth::{AccessPolicy, Permission};
use naranja_core::config::SyncConfig;
use naranja_core::error::AppError;
use naranja_core::result::AppResult;
use naranja_core::types::{DepartmentId, PageRequest, PageResponse, RoleId, UserId};
use naranja_database::{DepartmentStore, RoleHistoryStore, RoleStore, UserStore};
use naranja_entity::history::{Placement, RoleChange, RoleChangeHistoryEntry};
use naranja_entity::user::User;

use crate::assignment::{AssignmentSynchronizer, SyncOptions, SyncOutcome};
use crate::context::RequestContext;
use crate::retry::with_retry;

/// Outcome of a role change.
#[derive(Debug, Clone)]
pub struct RoleChangeOutcome {
    /// The history entry written, or `None` when nothing changed.
    pub history_entry: Option<RoleChangeHistoryEntry>,
    /// Result of the follow-up sync.
    pub sync: Result<SyncOutcome, AppError>,
}

impl RoleChangeOutcome {
    /// Whether the change was recorded but the sync failed.
    pub fn needs_resync(&self) -> bool {
        self.sync.is_err()
    }
}

/// Two consecutive history entries describing the same transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateTransition {
    /// The earlier entry.
    pub original: RoleChangeHistoryEntry,
    /// The later entry repeating it.
    pub duplicate: RoleChangeHistoryEntry,
}

/// Single entry point for changing a user's role or department.
#[derive(Clone)]
pub struct RoleChangeAuditor {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    departments: Arc<dyn DepartmentStore>,
    history: Arc<dyn RoleHistoryStore>,
    synchronizer: Arc<AssignmentSynchronizer>,
    policy: Arc<AccessPolicy>,
    config: SyncConfig,
}

impl std::fmt::Debug for RoleChangeAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleChangeAuditor").finish_non_exhaustive()
    }
}

impl RoleChangeAuditor {
    /// Creates a new auditor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        departments: Arc<dyn DepartmentStore>,
        history: Arc<dyn RoleHistoryStore>,
        synchronizer: Arc<AssignmentSynchronizer>,
        policy: Arc<AccessPolicy>,
        config: SyncConfig,
    ) -> Self {
        Self {
            users,
            roles,
            departments,
            history,
            synchronizer,
            policy,
            config,
        }
    }

    /// Apply and record `change`, then synchronize the user's assignments.
    ///
    /// Fails with `Conflict` if the user's placement no longer matches
    /// `change.from`. A change whose target equals its source writes no
    /// history but still syncs.
    pub async fn record_and_sync(
        &self,
        ctx: &RequestContext,
        change: RoleChange,
    ) -> AppResult<RoleChangeOutcome> {
        self.record_and_sync_with(ctx, change, SyncOptions::default())
            .await
    }

    /// [`Self::record_and_sync`] with per-call sync overrides.
    pub async fn record_and_sync_with(
        &self,
        ctx: &RequestContext,
        change: RoleChange,
        options: SyncOptions,
    ) -> AppResult<RoleChangeOutcome> {
        ctx.require(&self.policy, Permission::UsersChangeRole)?;
        if change.changed_by != ctx.user_id {
            return Err(AppError::authorization(
                "changed_by must be the authenticated caller",
            ));
        }

        self.require_user(change.user_id).await?;
        if let Some(role_id) = change.to.role_id {
            self.require_role(role_id).await?;
        }
        if let Some(department_id) = change.to.department_id {
            self.require_department(department_id).await?;
        }

        let history_entry = if change.is_noop() {
            info!(user_id = %change.user_id, "Role change is a no-op, skipping history");
            None
        } else {
            let entry = match self.history.record_transition(&change).await {
                Ok(entry) => entry,
                Err(err) if err.is_retryable() => self.recover_transition(&change, err).await?,
                Err(err) => return Err(err),
            };
            info!(
                user_id = %change.user_id,
                old_role_id = ?change.from.role_id,
                new_role_id = ?change.to.role_id,
                changed_by = %change.changed_by,
                history_entry_id = %entry.id,
                "User role changed"
            );
            Some(entry)
        };

        let sync = self
            .synchronizer
            .reconcile_user(change.user_id, None, self.synchronizer.prune(options))
            .await;
        if let Err(err) = &sync {
            warn!(
                user_id = %change.user_id,
                error = %err,
                "Sync after role change failed; history kept, resync required"
            );
        }

        Ok(RoleChangeOutcome {
            history_entry,
            sync,
        })
    }

    /// Role history of a user, newest first.
    pub async fn history_for_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        page: PageRequest,
    ) -> AppResult<PageResponse<RoleChangeHistoryEntry>> {
        ctx.require(&self.policy, Permission::HistoryView)?;
        self.require_user(user_id).await?;
        with_retry(&self.config, "list_role_history", || {
            self.history.list_for_user(user_id, &page)
        })
        .await
    }

    /// Consecutive entries that repeat the same transition.
    ///
    /// Reports only; history is never modified.
    pub async fn find_duplicate_transitions(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> AppResult<Vec<DuplicateTransition>> {
        ctx.require(&self.policy, Permission::HistoryView)?;
        self.require_user(user_id).await?;
        let entries = with_retry(&self.config, "load_role_history", || {
            self.history.all_for_user(user_id)
        })
        .await?;

        Ok(entries
            .windows(2)
            .filter(|pair| pair[0].same_transition(&pair[1]))
            .map(|pair| DuplicateTransition {
                original: pair[0].clone(),
                duplicate: pair[1].clone(),
            })
            .collect())
    }

    /// Settle a transition whose write failed transiently.
    ///
    /// The write may have committed before the failure was reported, so the
    /// user is re-read before every further attempt and the compare-and-set
    /// is only repeated while they still sit at `change.from`.
    async fn recover_transition(
        &self,
        change: &RoleChange,
        mut err: AppError,
    ) -> AppResult<RoleChangeHistoryEntry> {
        let mut attempt = 0;
        loop {
            warn!(
                user_id = %change.user_id,
                attempt,
                error = %err,
                "Role change write failed transiently, checking whether it committed"
            );
            let user = self.require_user(change.user_id).await?;
            let current = Placement {
                role_id: user.role_id,
                department_id: user.department_id,
            };

            if current == change.to {
                return self.committed_entry(change).await;
            }
            if current != change.from {
                return Err(AppError::conflict(format!(
                    "User {} was changed concurrently",
                    change.user_id
                )));
            }
            if attempt >= self.config.transient_retries {
                return Err(err);
            }

            attempt += 1;
            tokio::time::sleep(self.config.backoff_for(attempt)).await;
            match self.history.record_transition(change).await {
                Ok(entry) => return Ok(entry),
                Err(next) if next.is_retryable() => err = next,
                Err(next) => return Err(next),
            }
        }
    }

    /// The newest entry recording exactly `change`.
    async fn committed_entry(&self, change: &RoleChange) -> AppResult<RoleChangeHistoryEntry> {
        let entries = with_retry(&self.config, "load_role_history", || {
            self.history.all_for_user(change.user_id)
        })
        .await?;
        entries
            .into_iter()
            .rev()
            .find(|e| {
                e.old_role_id == change.from.role_id
                    && e.old_department_id == change.from.department_id
                    && e.new_role_id == change.to.role_id
                    && e.new_department_id == change.to.department_id
                    && e.changed_by == change.changed_by
            })
            .ok_or_else(|| {
                AppError::conflict(format!(
                    "User {} was changed concurrently",
                    change.user_id
                ))
            })
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<User> {
        with_retry(&self.config, "load_user", || self.users.find_by_id(user_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<()> {
        with_retry(&self.config, "load_role", || self.roles.find_by_id(role_id))
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))
    }

    async fn require_department(&self, department_id: DepartmentId) -> AppResult<()> {
        with_retry(&self.config, "load_department", || {
            self.departments.find_by_id(department_id)
        })
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(format!("Department {department_id} not found")))
    }
}
