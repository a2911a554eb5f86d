//! Assignment synchronization handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use naranja_service::{BatchReport, SyncOptions, SyncOutcome};

use crate::dto::request::{SyncRoleRequest, SyncUserRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// `207 Multi-Status` when some users failed, else `200`.
pub(crate) fn batch_status(report: &BatchReport) -> StatusCode {
    if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    }
}

/// POST /api/sync-role
pub async fn sync_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SyncRoleRequest>,
) -> Result<(StatusCode, Json<BatchReport>), ApiError> {
    let report = state
        .synchronizer
        .sync_role(
            &auth,
            req.role_id,
            SyncOptions {
                prune_completed: req.prune_completed,
            },
            state.shutdown.child_token(),
        )
        .await?;
    Ok((batch_status(&report), Json(report)))
}

/// POST /api/sync-user
pub async fn sync_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SyncUserRequest>,
) -> Result<Json<SyncOutcome>, ApiError> {
    let outcome = state
        .synchronizer
        .sync_user(
            &auth,
            req.user_id,
            SyncOptions {
                prune_completed: req.prune_completed,
            },
        )
        .await?;
    Ok(Json(outcome))
}
