//! Caller capability handler.

use axum::Json;
use axum::extract::State;

use naranja_auth::policy::ROUTE_GUARDS;

use crate::dto::response::CapabilitiesResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/me/capabilities
pub async fn capabilities(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<CapabilitiesResponse> {
    let level = auth.access_level;
    let routes = ROUTE_GUARDS
        .iter()
        .filter(|guard| state.policy.check_route(Some(level), guard.path))
        .map(|guard| guard.path.to_string())
        .collect();

    Json(CapabilitiesResponse {
        user_id: auth.user_id,
        access_level: level,
        access_level_name: level.display_name().to_string(),
        permissions: state.policy.capabilities(level),
        routes,
    })
}
