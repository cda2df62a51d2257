//! Integration tests for group endpoints and balance reporting.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    create_test_app, create_test_pool, empty_request, json_request, parse_response_body,
    run_migrations, test_config, unique_group_name,
};
use serde_json::json;
use tower::ServiceExt;

async fn create_group(app: &Router, name: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/groups",
            json!({ "name": name, "description": "test group" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}

#[tokio::test]
async fn test_create_and_get_group() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let name = unique_group_name();
    let group = create_group(&app, &name).await;
    assert_eq!(group["name"], name);
    assert_eq!(group["description"], "test group");

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/groups/{}", group["id"].as_str().unwrap()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["name"], name);
    assert_eq!(body["member_count"], 0);
    assert_eq!(body["members"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_group_blank_name_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let response = app
        .oneshot(json_request(Method::POST, "/api/groups", json!({ "name": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_group_404() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/groups/{}", uuid::Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_member_and_listing_includes_members() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let name = unique_group_name();
    let group = create_group(&app, &name).await;
    let group_id = group["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/groups/{}/members", group_id),
            json!({ "name": "alice", "email": "alice@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let member = parse_response_body(response).await;
    assert_eq!(member["name"], "alice");

    let response = app
        .oneshot(empty_request(Method::GET, "/api/groups"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let listed = body
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["name"] == name)
        .expect("created group should be listed");
    assert_eq!(listed["member_count"], 1);
    assert_eq!(listed["members"][0]["name"], "alice");
}

#[tokio::test]
async fn test_balances_report_unpaid_shares() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group = create_group(&app, &unique_group_name()).await;
    let group_id = group["id"].as_str().unwrap();

    for member in ["alice", "bob", "carol"] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/groups/{}/members", group_id),
                json!({ "name": member }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/transactions",
            json!({
                "group_id": group_id,
                "type": "expense",
                "amount": "300.00",
                "description": "Rent",
                "date": "2026-03-01T12:00:00Z",
                "is_shared": true,
                "paid_by": "alice"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/groups/{}/balances", group_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;

    let total: f64 = body["total_shared"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, 300.0);

    // The payer's share is marked paid, so only the others owe
    let balances = body["balances"].as_object().unwrap();
    assert!(!balances.contains_key("alice"));
    for member in ["bob", "carol"] {
        let owed: f64 = balances[member].as_str().unwrap().parse().unwrap();
        assert_eq!(owed, 100.0);
    }
}
