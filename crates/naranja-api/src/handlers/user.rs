//! Role change and role history handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use naranja_auth::Permission;
use naranja_core::error::AppError;
use naranja_core::types::UserId;
use naranja_entity::history::{Placement, RoleChange};
use naranja_service::SyncOptions;

use crate::dto::request::UpdateUserRoleRequest;
use crate::dto::response::{
    DuplicateTransitionResponse, HistoryEntryResponse, PaginatedResponse, RoleChangeResponse,
};
use crate::error::{ApiError, ApiErrorResponse};
use crate::extractors::{AuthUser, IdPath, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// POST /api/update-user-role
///
/// Responds `207` when the change was recorded but the follow-up sync
/// failed.
pub async fn update_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateUserRoleRequest>,
) -> Result<(StatusCode, Json<RoleChangeResponse>), ApiError> {
    auth.require(&state.policy, Permission::UsersChangeRole)?;

    let user = state
        .users
        .find_by_id(req.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", req.user_id)))?;
    let role = state
        .roles
        .find_by_id(req.new_role_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {} not found", req.new_role_id)))?;

    let department_id = req
        .new_department_id
        .or(role.department_id)
        .or(user.department_id);

    let change = RoleChange {
        user_id: user.id,
        from: Placement {
            role_id: user.role_id,
            department_id: user.department_id,
        },
        to: Placement {
            role_id: Some(role.id),
            department_id,
        },
        changed_by: req.changed_by,
    };

    let outcome = state
        .auditor
        .record_and_sync_with(
            &auth,
            change,
            SyncOptions {
                prune_completed: req.prune_completed,
            },
        )
        .await?;
    let history_entry_id = outcome.history_entry.as_ref().map(|e| e.id);

    let (status, sync_result, sync_error) = match outcome.sync {
        Ok(sync) => (StatusCode::OK, Some(sync), None),
        Err(err) => (
            StatusCode::MULTI_STATUS,
            None,
            Some(ApiErrorResponse::from_error(&err)),
        ),
    };

    Ok((
        status,
        Json(RoleChangeResponse {
            history_entry_id,
            sync_result,
            sync_error,
        }),
    ))
}

/// GET /api/users/{id}/role-history
pub async fn role_history(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<UserId>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<HistoryEntryResponse>>, ApiError> {
    let page = state
        .auditor
        .history_for_user(&auth, user_id, params.into_page_request())
        .await?;
    Ok(Json(page.into()))
}

/// GET /api/users/{id}/role-history/duplicates
pub async fn duplicate_transitions(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<UserId>,
) -> Result<Json<Vec<DuplicateTransitionResponse>>, ApiError> {
    let duplicates = state
        .auditor
        .find_duplicate_transitions(&auth, user_id)
        .await?;
    Ok(Json(duplicates.into_iter().map(Into::into).collect()))
}
