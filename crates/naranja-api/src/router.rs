//! Route definitions for the Naranja HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request logger.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(access_routes())
        .merge(sync_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(department_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// What the caller may do
fn access_routes() -> Router<AppState> {
    Router::new().route("/me/capabilities", get(handlers::access::capabilities))
}

/// Assignment reconciliation
fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/sync-role", post(handlers::sync::sync_role))
        .route("/sync-user", post(handlers::sync::sync_user))
}

/// Role changes and history
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/update-user-role", post(handlers::user::update_user_role))
        .route("/users/{id}/role-history", get(handlers::user::role_history))
        .route(
            "/users/{id}/role-history/duplicates",
            get(handlers::user::duplicate_transitions),
        )
}

/// Role curricula
fn role_routes() -> Router<AppState> {
    Router::new().route(
        "/roles/{id}/required-items",
        get(handlers::role::required_items).put(handlers::role::replace_required_items),
    )
}

/// Department tree
fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", post(handlers::department::create_department))
        .route(
            "/departments/{id}/parent",
            put(handlers::department::move_department),
        )
        .route(
            "/departments/{id}/ancestors",
            get(handlers::department::ancestors),
        )
        .route(
            "/departments/{id}/required-items",
            get(handlers::department::required_items),
        )
}
