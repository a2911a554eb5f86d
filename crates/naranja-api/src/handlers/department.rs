//! Department tree handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use naranja_auth::Permission;
use naranja_core::types::DepartmentId;

use crate::dto::request::{CreateDepartmentRequest, MoveDepartmentRequest};
use crate::dto::response::{DepartmentItemsResponse, DepartmentResponse, RequiredItemResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::state::AppState;

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    let department = state
        .department_service
        .create_department(&auth, &req.name, req.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

/// PUT /api/departments/{id}/parent
pub async fn move_department(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(department_id): IdPath<DepartmentId>,
    ValidatedJson(req): ValidatedJson<MoveDepartmentRequest>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    let department = state
        .department_service
        .move_department(&auth, department_id, req.parent_id)
        .await?;
    Ok(Json(department.into()))
}

/// GET /api/departments/{id}/ancestors
pub async fn ancestors(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(department_id): IdPath<DepartmentId>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    auth.require(&state.policy, Permission::TrainingView)?;
    let chain = state.department_service.ancestors(department_id).await?;
    Ok(Json(chain.into_iter().map(Into::into).collect()))
}

/// GET /api/departments/{id}/required-items
pub async fn required_items(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(department_id): IdPath<DepartmentId>,
) -> Result<Json<DepartmentItemsResponse>, ApiError> {
    auth.require(&state.policy, Permission::TrainingView)?;
    let items = state
        .resolver
        .required_items_for_department(department_id)
        .await?;
    Ok(Json(DepartmentItemsResponse {
        department_id,
        items: items.into_iter().map(RequiredItemResponse::from).collect(),
    }))
}
