//! Caller identification and access policy enforcement.

use axum::http::StatusCode;
use serde_json::json;

use naranja_entity::user::AccessLevel;

use crate::helpers::{TestApp, token_expiring, token_for};

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/sync-role", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_401() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/me/capabilities", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = TestApp::new();
    let user = app.user(AccessLevel::Admin, None, None).await;
    let token = token_expiring(&user.auth_subject, chrono::Utc::now().timestamp() - 3600);
    let response = app
        .request("GET", "/api/me/capabilities", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unregistered_subject_is_401() {
    let app = TestApp::new();
    let token = token_for("auth0|nobody");
    let response = app
        .request("GET", "/api/me/capabilities", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hr_admin_capabilities() {
    let app = TestApp::new();
    let (user, token) = app.caller(AccessLevel::HrAdmin).await;
    let response = app
        .request("GET", "/api/me/capabilities", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["userId"], user.id.to_string());
    assert_eq!(response.body["accessLevel"], "hr_admin");

    let permissions: Vec<&str> = response.body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_str())
        .collect();
    assert!(permissions.contains(&"users.change_role"));
    assert!(permissions.contains(&"assignments.sync"));
    assert!(!permissions.contains(&"audit.view"));

    let routes: Vec<&str> = response.body["routes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.as_str())
        .collect();
    assert!(routes.contains(&"/admin/users"));
    assert!(!routes.contains(&"/audit"));
    assert!(!routes.contains(&"/tenants"));
}

#[tokio::test]
async fn test_manager_cannot_sync_role() {
    let app = TestApp::new();
    let role = app.role("Nurse", None).await;
    let (_, token) = app.caller(AccessLevel::Manager).await;

    let response = app
        .request(
            "POST",
            "/api/sync-role",
            Some(json!({ "role_id": role.id })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_level_comes_from_store_not_token() {
    let app = TestApp::new();
    let role = app.role("Nurse", None).await;
    let (_, token) = app.caller(AccessLevel::User).await;

    let response = app
        .request(
            "POST",
            "/api/sync-user",
            Some(json!({ "user_id": uuid::Uuid::new_v4() })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "GET",
            &format!("/api/roles/{}/required-items", role.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
