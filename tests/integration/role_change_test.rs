//! Role changes, history, and the follow-up sync over HTTP.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use naranja_entity::history::Placement;
use naranja_entity::requirement::ItemType;
use naranja_entity::user::AccessLevel;

use crate::helpers::{StaleUser, TestApp, UnreachableFor};

#[tokio::test]
async fn test_role_change_moves_assignments_and_records_history() {
    let app = TestApp::new();
    let wards = app.department("Wards", None).await;
    let kitchen = app.department("Kitchen", None).await;
    let nurse = app.role("Nurse", Some(wards.id)).await;
    let chef = app.role("Chef", Some(kitchen.id)).await;
    let nursing_item = app.require(nurse.id, ItemType::Module).await;
    let food_hygiene = app.require(chef.id, ItemType::Module).await;
    let knife_skills = app.require(chef.id, ItemType::Behaviour).await;
    let mover = app
        .user(AccessLevel::User, Some(nurse.id), Some(wards.id))
        .await;
    let (admin, token) = app.caller(AccessLevel::HrAdmin).await;

    app.request(
        "POST",
        "/api/sync-user",
        Some(json!({ "user_id": mover.id })),
        Some(&token),
    )
    .await;
    assert_eq!(app.held_keys(mover.id).await, vec![nursing_item]);

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": mover.id,
                "new_role_id": chef.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["historyEntryId"].is_string());
    assert_eq!(response.body["syncResult"]["inserted"], 2);
    assert_eq!(response.body["syncResult"]["removed"], 1);

    let held = app.held_keys(mover.id).await;
    assert_eq!(held.len(), 2);
    assert!(held.contains(&food_hygiene));
    assert!(held.contains(&knife_skills));

    let history = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history", mover.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["totalItems"], 1);
    let entry = &history.body["items"][0];
    assert_eq!(entry["oldRoleId"], nurse.id.to_string());
    assert_eq!(entry["newRoleId"], chef.id.to_string());
    // The new department defaults to the role's.
    assert_eq!(entry["oldDepartmentId"], wards.id.to_string());
    assert_eq!(entry["newDepartmentId"], kitchen.id.to_string());
    assert_eq!(entry["changedBy"], admin.id.to_string());
}

#[tokio::test]
async fn test_department_only_change_writes_one_entry() {
    let app = TestApp::new();
    let north = app.department("North", None).await;
    let south = app.department("South", None).await;
    let porter = app.role("Porter", None).await;
    let item = app.require(porter.id, ItemType::Document).await;
    let mover = app
        .user(AccessLevel::User, Some(porter.id), Some(north.id))
        .await;
    let (admin, token) = app.caller(AccessLevel::HrAdmin).await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": mover.id,
                "new_role_id": porter.id,
                "new_department_id": south.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["historyEntryId"].is_string());
    assert_eq!(app.held_keys(mover.id).await, vec![item]);

    let history = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history", mover.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(history.body["totalItems"], 1);
    let entry = &history.body["items"][0];
    assert_eq!(entry["oldRoleId"], porter.id.to_string());
    assert_eq!(entry["newRoleId"], porter.id.to_string());
    assert_eq!(entry["oldDepartmentId"], north.id.to_string());
    assert_eq!(entry["newDepartmentId"], south.id.to_string());
}

#[tokio::test]
async fn test_role_change_honours_prune_override() {
    let app = TestApp::new();
    let nurse = app.role("Nurse", None).await;
    let chef = app.role("Chef", None).await;
    let finished = app.require(nurse.id, ItemType::Module).await;
    let mover = app.user(AccessLevel::User, Some(nurse.id), None).await;
    let (admin, token) = app.caller(AccessLevel::HrAdmin).await;

    app.request(
        "POST",
        "/api/sync-user",
        Some(json!({ "user_id": mover.id })),
        Some(&token),
    )
    .await;
    app.store
        .mark_completed(mover.id, finished, chrono::Utc::now())
        .await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": mover.id,
                "new_role_id": chef.id,
                "changed_by": admin.id,
                "prune_completed": true,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["syncResult"]["removed"], 1);
    assert!(app.held_keys(mover.id).await.is_empty());
}

#[tokio::test]
async fn test_changed_by_must_be_caller() {
    let app = TestApp::new();
    let role = app.role("Nurse", None).await;
    let target = app.user(AccessLevel::User, None, None).await;
    let (_, token) = app.caller(AccessLevel::Admin).await;
    let someone_else = app.user(AccessLevel::Admin, None, None).await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": target.id,
                "new_role_id": role.id,
                "changed_by": someone_else.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_user_or_role_is_404() {
    let app = TestApp::new();
    let role = app.role("Nurse", None).await;
    let target = app.user(AccessLevel::User, None, None).await;
    let (admin, token) = app.caller(AccessLevel::Admin).await;

    let no_user = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": uuid::Uuid::new_v4(),
                "new_role_id": role.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(no_user.status, StatusCode::NOT_FOUND);

    let no_role = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": target.id,
                "new_role_id": uuid::Uuid::new_v4(),
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(no_role.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unchanged_placement_writes_no_history() {
    let app = TestApp::new();
    let role = app.role("Nurse", None).await;
    let target = app.user(AccessLevel::User, Some(role.id), None).await;
    let (admin, token) = app.caller(AccessLevel::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": target.id,
                "new_role_id": role.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["historyEntryId"].is_null());

    let history = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history", target.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(history.body["totalItems"], 0);
}

#[tokio::test]
async fn test_stale_placement_is_409() {
    let base = TestApp::new();
    let nurse = base.role("Nurse", None).await;
    let chef = base.role("Chef", None).await;
    let target = base.user(AccessLevel::User, Some(nurse.id), None).await;

    let stale = Placement {
        role_id: None,
        department_id: None,
    };
    let users = Arc::new(StaleUser::new(base.store.clone(), target.id, stale));
    let app = base.with_users(users);
    let (admin, token) = app.caller(AccessLevel::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": target.id,
                "new_role_id": chef.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_failed_sync_after_change_is_207_and_history_kept() {
    let base = TestApp::new();
    let nurse = base.role("Nurse", None).await;
    base.require(nurse.id, ItemType::Module).await;
    let target = base.user(AccessLevel::User, None, None).await;

    let flaky = Arc::new(UnreachableFor::new(base.store.clone()));
    flaky.block(target.id).await;
    let app = base.with_assignments(flaky);
    let (admin, token) = app.caller(AccessLevel::HrAdmin).await;

    let response = app
        .request(
            "POST",
            "/api/update-user-role",
            Some(json!({
                "user_id": target.id,
                "new_role_id": nurse.id,
                "changed_by": admin.id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::MULTI_STATUS);
    assert!(response.body["historyEntryId"].is_string());
    assert!(response.body["syncResult"].is_null());
    assert_eq!(response.body["syncError"]["error"], "STORE_UNAVAILABLE");

    let history = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history", target.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(history.body["totalItems"], 1);
}

#[tokio::test]
async fn test_duplicate_transitions_reported() {
    let app = TestApp::new();
    let nurse = app.role("Nurse", None).await;
    let chef = app.role("Chef", None).await;
    let target = app.user(AccessLevel::User, Some(nurse.id), None).await;
    let (admin, token) = app.caller(AccessLevel::Admin).await;

    let body = json!({
        "user_id": target.id,
        "new_role_id": chef.id,
        "changed_by": admin.id,
    });
    let first = app
        .request("POST", "/api/update-user-role", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    // Someone reverts the user without going through the service.
    app.store
        .force_placement(
            target.id,
            Placement {
                role_id: Some(nurse.id),
                department_id: None,
            },
        )
        .await;

    let second = app
        .request("POST", "/api/update-user-role", Some(body), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history/duplicates", target.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let pairs = response.body.as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["original"]["id"], first.body["historyEntryId"]);
    assert_eq!(pairs[0]["duplicate"]["id"], second.body["historyEntryId"]);
}

#[tokio::test]
async fn test_role_history_requires_history_permission() {
    let app = TestApp::new();
    let target = app.user(AccessLevel::User, None, None).await;
    let (_, token) = app.caller(AccessLevel::Trainer).await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}/role-history", target.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
