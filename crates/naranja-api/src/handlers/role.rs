//! Role curriculum handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use naranja_auth::Permission;
use naranja_core::types::RoleId;
use naranja_service::SyncOptions;

use super::sync::batch_status;
use crate::dto::request::ReplaceRequiredItemsRequest;
use crate::dto::response::{CurriculumUpdateResponse, RequiredItemResponse, RoleItemsResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::state::AppState;

/// GET /api/roles/{id}/required-items
pub async fn required_items(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(role_id): IdPath<RoleId>,
) -> Result<Json<RoleItemsResponse>, ApiError> {
    auth.require(&state.policy, Permission::TrainingView)?;
    let items = state.resolver.required_items_for_role(role_id).await?;
    Ok(Json(RoleItemsResponse {
        role_id,
        items: items.into_iter().map(RequiredItemResponse::from).collect(),
    }))
}

/// PUT /api/roles/{id}/required-items
///
/// Replaces the curriculum, then resyncs every holder of the role.
pub async fn replace_required_items(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(role_id): IdPath<RoleId>,
    ValidatedJson(req): ValidatedJson<ReplaceRequiredItemsRequest>,
) -> Result<(StatusCode, Json<CurriculumUpdateResponse>), ApiError> {
    let items = state
        .resolver
        .replace_required_items(&auth, role_id, &req.keys())
        .await?;

    let sync = state
        .synchronizer
        .sync_role(
            &auth,
            role_id,
            SyncOptions {
                prune_completed: req.prune_completed,
            },
            state.shutdown.child_token(),
        )
        .await?;

    Ok((
        batch_status(&sync),
        Json(CurriculumUpdateResponse {
            role_id,
            items: items.into_iter().map(RequiredItemResponse::from).collect(),
            sync,
        }),
    ))
}
