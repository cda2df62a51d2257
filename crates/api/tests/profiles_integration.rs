//! Integration tests for user profile endpoints.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, create_test_pool, empty_request, json_request, parse_response_body,
    run_migrations, test_config, unique_member_name,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_and_get_profile_with_defaults() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let public_name = unique_member_name();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/profile",
            json!({ "public_name": public_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = parse_response_body(response).await;
    assert_eq!(profile["public_name"], public_name);
    assert_eq!(profile["currency"], "PKR");
    assert_eq!(profile["language"], "en");
    assert_eq!(profile["theme"], "light");
    assert_eq!(profile["notifications"], true);

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/profile/{}", profile["id"].as_str().unwrap()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = parse_response_body(response).await;
    assert_eq!(fetched["public_name"], public_name);
}

#[tokio::test]
async fn test_duplicate_public_name_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let public_name = unique_member_name();

    for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/profile",
                json!({ "public_name": public_name }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_update_profile_partial_fields() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let public_name = unique_member_name();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/profile",
            json!({ "public_name": public_name }),
        ))
        .await
        .unwrap();
    let profile = parse_response_body(response).await;
    let id = profile["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/profile/{}", id),
            json!({ "theme": "dark", "currency": "EUR" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["theme"], "dark");
    assert_eq!(updated["currency"], "EUR");
    // Untouched fields keep their values
    assert_eq!(updated["public_name"], public_name);
    assert_eq!(updated["language"], "en");
}

#[tokio::test]
async fn test_update_profile_name_conflict_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let first_name = unique_member_name();
    let second_name = unique_member_name();

    let mut ids = Vec::new();
    for name in [&first_name, &second_name] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/profile",
                json!({ "public_name": name }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(
            parse_response_body(response).await["id"]
                .as_str()
                .unwrap()
                .to_string(),
        );
    }

    // Renaming the second profile to the first's name conflicts
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/profile/{}", ids[1]),
            json!({ "public_name": first_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Renaming a profile to its own current name is fine
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/profile/{}", ids[0]),
            json!({ "public_name": first_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_unknown_profile_404() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/profile/{}", uuid::Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
