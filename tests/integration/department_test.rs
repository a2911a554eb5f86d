//! Department tree and department-level curricula over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use naranja_entity::requirement::ItemType;
use naranja_entity::user::AccessLevel;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_and_move_departments() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::HrAdmin).await;

    let root = app
        .request(
            "POST",
            "/api/departments",
            Some(json!({ "name": "Clinical" })),
            Some(&token),
        )
        .await;
    assert_eq!(root.status, StatusCode::CREATED);
    let root_id = root.body["id"].as_str().unwrap().to_string();
    assert!(root.body["parentId"].is_null());

    let child = app
        .request(
            "POST",
            "/api/departments",
            Some(json!({ "name": "Ward 4", "parent_id": root_id })),
            Some(&token),
        )
        .await;
    assert_eq!(child.status, StatusCode::CREATED);
    let child_id = child.body["id"].as_str().unwrap().to_string();
    assert_eq!(child.body["parentId"], root_id);

    let cycle = app
        .request(
            "PUT",
            &format!("/api/departments/{root_id}/parent"),
            Some(json!({ "parent_id": child_id })),
            Some(&token),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);

    let detach = app
        .request(
            "PUT",
            &format!("/api/departments/{child_id}/parent"),
            Some(json!({ "parent_id": null })),
            Some(&token),
        )
        .await;
    assert_eq!(detach.status, StatusCode::OK);
    assert!(detach.body["parentId"].is_null());
}

#[tokio::test]
async fn test_blank_department_name_is_400() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::Admin).await;
    let response = app
        .request(
            "POST",
            "/api/departments",
            Some(json!({ "name": "" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_user_level_cannot_create_department() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::User).await;
    let response = app
        .request(
            "POST",
            "/api/departments",
            Some(json!({ "name": "Shadow IT" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ancestors_nearest_first() {
    let app = TestApp::new();
    let trust = app.department("Trust", None).await;
    let clinical = app.department("Clinical", Some(trust.id)).await;
    let ward = app.department("Ward 4", Some(clinical.id)).await;
    let (_, token) = app.caller(AccessLevel::User).await;

    let response = app
        .request(
            "GET",
            &format!("/api/departments/{}/ancestors", ward.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Clinical", "Trust"]);
}

#[tokio::test]
async fn test_department_items_union_of_roles() {
    let app = TestApp::new();
    let kitchen = app.department("Kitchen", None).await;
    let chef = app.role("Chef", Some(kitchen.id)).await;
    let porter = app.role("Kitchen Porter", Some(kitchen.id)).await;
    let elsewhere = app.role("Nurse", None).await;
    app.require(chef.id, ItemType::Module).await;
    app.require(porter.id, ItemType::Document).await;
    app.require(elsewhere.id, ItemType::Module).await;
    let (_, token) = app.caller(AccessLevel::Manager).await;

    let response = app
        .request(
            "GET",
            &format!("/api/departments/{}/required-items", kitchen.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["departmentId"], kitchen.id.to_string());
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_department_is_404_and_bad_id_is_400() {
    let app = TestApp::new();
    let (_, token) = app.caller(AccessLevel::Admin).await;

    let missing = app
        .request(
            "GET",
            &format!("/api/departments/{}/ancestors", uuid::Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let malformed = app
        .request(
            "GET",
            "/api/departments/not-a-uuid/required-items",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}
