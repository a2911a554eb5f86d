//! Role and user synchronization over HTTP.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use naranja_entity::requirement::ItemType;
use naranja_entity::user::AccessLevel;

use crate::helpers::{TestApp, UnreachableFor};

#[tokio::test]
async fn test_sync_role_is_idempotent() {
    let app = TestApp::new();
    let role = app.role("Care Assistant", None).await;
    app.require(role.id, ItemType::Module).await;
    app.require(role.id, ItemType::Document).await;
    let first = app.user(AccessLevel::User, Some(role.id), None).await;
    let second = app.user(AccessLevel::User, Some(role.id), None).await;
    let (_, token) = app.caller(AccessLevel::HrAdmin).await;

    let body = json!({ "role_id": role.id });
    let response = app
        .request("POST", "/api/sync-role", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["roleId"], role.id.to_string());
    assert_eq!(response.body["usersAffected"], 2);
    assert_eq!(response.body["totalInserted"], 4);
    assert_eq!(response.body["totalRemoved"], 0);
    assert_eq!(response.body["errors"], json!([]));
    assert_eq!(response.body["cancelled"], false);

    let again = app
        .request("POST", "/api/sync-role", Some(body), Some(&token))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["totalInserted"], 0);
    assert_eq!(again.body["totalRemoved"], 0);

    assert_eq!(app.held_keys(first.id).await.len(), 2);
    assert_eq!(app.held_keys(second.id).await.len(), 2);
}

#[tokio::test]
async fn test_sync_role_unknown_role_is_404() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::Admin).await;
    let response = app
        .request(
            "POST",
            "/api/sync-role",
            Some(json!({ "role_id": uuid::Uuid::new_v4() })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_sync_role_missing_field_is_400() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::Admin).await;

    let missing = app
        .request("POST", "/api/sync-role", Some(json!({})), Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "VALIDATION_ERROR");

    let malformed = app
        .request(
            "POST",
            "/api/sync-role",
            Some(json!({ "role_id": "seven" })),
            Some(&token),
        )
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partial_batch_is_207() {
    let base = TestApp::new();
    let role = base.role("Porter", None).await;
    base.require(role.id, ItemType::Module).await;
    let healthy = base.user(AccessLevel::User, Some(role.id), None).await;
    let broken = base.user(AccessLevel::User, Some(role.id), None).await;

    let flaky = Arc::new(UnreachableFor::new(base.store.clone()));
    flaky.block(broken.id).await;
    let app = base.with_assignments(flaky);
    let (_, token) = app.caller(AccessLevel::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/sync-role",
            Some(json!({ "role_id": role.id })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert_eq!(response.body["usersAffected"], 1);
    assert_eq!(response.body["totalInserted"], 1);
    let errors = response.body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["userId"], broken.id.to_string());
    assert_eq!(errors[0]["kind"], "TransientStore");

    assert_eq!(app.held_keys(healthy.id).await.len(), 1);
    assert!(app.held_keys(broken.id).await.is_empty());
}

#[tokio::test]
async fn test_curriculum_change_keeps_completed_work() {
    let app = TestApp::new();
    let role = app.role("Ward Clerk", None).await;
    let kept = app.require(role.id, ItemType::Module).await;
    let done = app.require(role.id, ItemType::Document).await;
    let dropped = app.require(role.id, ItemType::Behaviour).await;
    let holder = app.user(AccessLevel::User, Some(role.id), None).await;
    let (_, token) = app.caller(AccessLevel::HrAdmin).await;

    app.request(
        "POST",
        "/api/sync-user",
        Some(json!({ "user_id": holder.id })),
        Some(&token),
    )
    .await;
    assert!(
        app.store
            .mark_completed(holder.id, done, chrono::Utc::now())
            .await
    );

    let response = app
        .request(
            "PUT",
            &format!("/api/roles/{}/required-items", role.id),
            Some(json!({
                "items": [{ "item_id": kept.item_id, "item_type": "module" }]
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["sync"]["totalRemoved"], 1);

    let held = app.held_keys(holder.id).await;
    assert!(held.contains(&kept));
    assert!(held.contains(&done));
    assert!(!held.contains(&dropped));
}

#[tokio::test]
async fn test_prune_completed_override_removes_completed() {
    let app = TestApp::new();
    let role = app.role("Ward Clerk", None).await;
    let done = app.require(role.id, ItemType::Document).await;
    let holder = app.user(AccessLevel::User, Some(role.id), None).await;
    let (_, token) = app.caller(AccessLevel::Admin).await;

    app.request(
        "POST",
        "/api/sync-user",
        Some(json!({ "user_id": holder.id })),
        Some(&token),
    )
    .await;
    app.store
        .mark_completed(holder.id, done, chrono::Utc::now())
        .await;

    let response = app
        .request(
            "PUT",
            &format!("/api/roles/{}/required-items", role.id),
            Some(json!({ "items": [], "prune_completed": true })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sync"]["totalRemoved"], 1);
    assert!(app.held_keys(holder.id).await.is_empty());
}

#[tokio::test]
async fn test_sync_user_reports_counts() {
    let app = TestApp::new();
    let role = app.role("Chef", None).await;
    app.require(role.id, ItemType::Module).await;
    app.require(role.id, ItemType::Behaviour).await;
    let holder = app.user(AccessLevel::User, Some(role.id), None).await;
    let (_, token) = app.caller(AccessLevel::HrAdmin).await;

    let response = app
        .request(
            "POST",
            "/api/sync-user",
            Some(json!({ "user_id": holder.id })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["userId"], holder.id.to_string());
    assert_eq!(response.body["inserted"], 2);
    assert_eq!(response.body["removed"], 0);
    assert_eq!(response.body["retainedCompleted"], 0);
}

#[tokio::test]
async fn test_sync_user_unknown_user_is_404() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::Admin).await;
    let response = app
        .request(
            "POST",
            "/api/sync-user",
            Some(json!({ "user_id": uuid::Uuid::new_v4() })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
