//! Reconciles persisted assignment rows with the required-item set.
//!
//! Only role-derived rows are created or removed here. Manual rows count as
//! satisfying an obligation but are never deleted, and completed rows are
//! kept unless pruning is switched on.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use naranja_auth::{AccessPolicy, Permission};
use naranja_core::config::SyncConfig;
use naranja_core::error::{AppError, ErrorKind};
use naranja_core::result::AppResult;
use naranja_core::types::{RoleId, UserId};
use naranja_database::{AssignmentStore, UserStore};
use naranja_entity::assignment::{NewAssignment, UserAssignment};
use naranja_entity::requirement::{ItemKey, RequiredItem};

use super::resolver::{AssignmentResolver, RoleSnapshot};
use crate::context::RequestContext;
use crate::retry::with_retry;

/// Per-call overrides of the configured sync policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Force removal of obsolete completed rows for this call.
    pub prune_completed: Option<bool>,
}

/// Result of reconciling one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// The user reconciled.
    pub user_id: UserId,
    /// The role the user was reconciled against.
    pub role_id: Option<RoleId>,
    /// Rows inserted.
    pub inserted: u64,
    /// Role-derived rows removed.
    pub removed: u64,
    /// Obsolete role-derived rows kept because they were completed.
    pub retained_completed: u64,
}

/// One user's failure inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    /// The user whose sync failed.
    pub user_id: UserId,
    /// Error category.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

/// Result of syncing every holder of a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// The role synced.
    pub role_id: RoleId,
    /// Users synced successfully.
    pub users_affected: u64,
    /// Rows inserted across all users.
    pub total_inserted: u64,
    /// Rows removed across all users.
    pub total_removed: u64,
    /// Users whose sync failed.
    pub errors: Vec<BatchError>,
    /// Whether the batch was cancelled.
    pub cancelled: bool,
    /// Users not started because of cancellation.
    pub skipped: u64,
}

impl BatchReport {
    /// Whether some users failed.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Applies the diff between required items and held assignments.
#[derive(Clone)]
pub struct AssignmentSynchronizer {
    users: Arc<dyn UserStore>,
    assignments: Arc<dyn AssignmentStore>,
    resolver: Arc<AssignmentResolver>,
    policy: Arc<AccessPolicy>,
    config: SyncConfig,
}

impl std::fmt::Debug for AssignmentSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentSynchronizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AssignmentSynchronizer {
    /// Creates a new synchronizer.
    pub fn new(
        users: Arc<dyn UserStore>,
        assignments: Arc<dyn AssignmentStore>,
        resolver: Arc<AssignmentResolver>,
        policy: Arc<AccessPolicy>,
        config: SyncConfig,
    ) -> Self {
        Self {
            users,
            assignments,
            resolver,
            policy,
            config,
        }
    }

    /// Reconcile one user against their current role.
    pub async fn sync_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        options: SyncOptions,
    ) -> AppResult<SyncOutcome> {
        ctx.require(&self.policy, Permission::AssignmentsSync)?;
        self.reconcile_user(user_id, None, self.prune(options)).await
    }

    /// Reconcile every user currently holding `role_id`.
    ///
    /// Per-user failures are collected in the report rather than aborting
    /// the batch. Cancelling `cancel` stops new users from starting; users
    /// already in flight finish.
    pub async fn sync_role(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        options: SyncOptions,
        cancel: CancellationToken,
    ) -> AppResult<BatchReport> {
        ctx.require(&self.policy, Permission::AssignmentsSync)?;
        let prune = self.prune(options);

        let snapshot = self.resolver.snapshot_for_role(role_id).await?;
        let user_ids = with_retry(&self.config, "list_role_members", || {
            self.users.list_ids_by_role(role_id)
        })
        .await?;

        info!(
            role_id = %role_id,
            users = user_ids.len(),
            required_items = snapshot.items.len(),
            prune_completed = prune,
            "Starting role sync"
        );

        let snapshot = Arc::new(snapshot);
        let results: Vec<(UserId, Option<AppResult<SyncOutcome>>)> =
            futures::stream::iter(user_ids)
                .map(|user_id| {
                    let this = self.clone();
                    let snapshot = Arc::clone(&snapshot);
                    let cancel = cancel.clone();
                    async move {
                        if cancel.is_cancelled() {
                            return (user_id, None);
                        }
                        let result = this.reconcile_user(user_id, Some(&snapshot), prune).await;
                        (user_id, Some(result))
                    }
                })
                .buffer_unordered(self.config.batch_concurrency.max(1))
                .collect()
                .await;

        let mut report = BatchReport {
            role_id,
            users_affected: 0,
            total_inserted: 0,
            total_removed: 0,
            errors: Vec::new(),
            cancelled: cancel.is_cancelled(),
            skipped: 0,
        };

        for (user_id, result) in results {
            match result {
                Some(Ok(outcome)) => {
                    report.users_affected += 1;
                    report.total_inserted += outcome.inserted;
                    report.total_removed += outcome.removed;
                }
                Some(Err(err)) => {
                    warn!(role_id = %role_id, user_id = %user_id, error = %err, "User sync failed");
                    report.errors.push(BatchError {
                        user_id,
                        kind: err.kind,
                        message: err.message,
                    });
                }
                None => report.skipped += 1,
            }
        }
        report.errors.sort_by_key(|e| e.user_id);

        info!(
            role_id = %role_id,
            users_affected = report.users_affected,
            total_inserted = report.total_inserted,
            total_removed = report.total_removed,
            failed = report.errors.len(),
            skipped = report.skipped,
            cancelled = report.cancelled,
            "Role sync finished"
        );
        Ok(report)
    }

    /// Reconcile one user without an authorization check.
    ///
    /// When `snapshot` names the user's current role its item set is used
    /// instead of the one read with the user.
    pub(crate) async fn reconcile_user(
        &self,
        user_id: UserId,
        snapshot: Option<&RoleSnapshot>,
        prune_completed: bool,
    ) -> AppResult<SyncOutcome> {
        let view = with_retry(&self.config, "load_sync_view", || {
            self.assignments.load_sync_view(user_id)
        })
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let role_id = view.user.role_id;
        let required: BTreeSet<ItemKey> = match (role_id, &view.role) {
            (None, _) => BTreeSet::new(),
            (Some(id), None) => {
                return Err(AppError::not_found(format!(
                    "Role {id} of user {user_id} not found"
                )));
            }
            (Some(id), Some(_)) => match snapshot {
                Some(snap) if snap.role.id == id => snap.items.clone(),
                _ => view.required.iter().map(RequiredItem::key).collect(),
            },
        };

        let plan = plan_diff(&required, &view.assignments, prune_completed);

        let inserted = match role_id {
            Some(role_id) if !plan.to_insert.is_empty() => {
                let rows: Vec<NewAssignment> = plan
                    .to_insert
                    .iter()
                    .map(|key| NewAssignment::from_role(user_id, role_id, *key))
                    .collect();
                with_retry(&self.config, "insert_assignments", || {
                    self.assignments.insert_missing(&rows)
                })
                .await?
            }
            _ => 0,
        };

        let removed = if plan.to_remove.is_empty() {
            0
        } else {
            with_retry(&self.config, "remove_assignments", || {
                self.assignments
                    .remove_role_derived(user_id, &plan.to_remove, prune_completed)
            })
            .await?
        };

        let outcome = SyncOutcome {
            user_id,
            role_id,
            inserted,
            removed,
            retained_completed: plan.retained_completed,
        };

        if inserted > 0 || removed > 0 {
            info!(
                user_id = %user_id,
                role_id = ?role_id,
                inserted,
                removed,
                retained_completed = plan.retained_completed,
                "User assignments synchronized"
            );
        }
        Ok(outcome)
    }

    pub(crate) fn prune(&self, options: SyncOptions) -> bool {
        options.prune_completed.unwrap_or(self.config.prune_completed)
    }
}

/// The changes needed to bring a user's rows in line with `required`.
#[derive(Debug, Default, PartialEq, Eq)]
struct DiffPlan {
    to_insert: Vec<ItemKey>,
    to_remove: Vec<ItemKey>,
    retained_completed: u64,
}

/// Missing obligations are computed against every held row, so a manual
/// row satisfies its item. Obsolete rows are computed against role-derived
/// rows only.
fn plan_diff(
    required: &BTreeSet<ItemKey>,
    held: &[UserAssignment],
    prune_completed: bool,
) -> DiffPlan {
    let held_by_key: BTreeMap<ItemKey, &UserAssignment> =
        held.iter().map(|row| (row.key(), row)).collect();

    let to_insert = required
        .iter()
        .filter(|key| !held_by_key.contains_key(key))
        .copied()
        .collect();

    let mut plan = DiffPlan {
        to_insert,
        ..DiffPlan::default()
    };

    for (key, row) in &held_by_key {
        if !row.is_role_derived() || required.contains(key) {
            continue;
        }
        if row.is_completed() && !prune_completed {
            plan.retained_completed += 1;
        } else {
            plan.to_remove.push(*key);
        }
    }

    plan
}
