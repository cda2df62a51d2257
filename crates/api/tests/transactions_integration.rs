//! Integration tests for transaction endpoints and split behavior.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    create_test_app, create_test_app_with_broadcaster, create_test_pool, empty_request,
    json_request, parse_response_body, run_migrations, test_config, unique_group_name,
};
use expenseshare_api::services::Broadcaster;
use serde_json::json;
use tower::ServiceExt;

async fn create_group_with_members(app: &Router, members: &[&str]) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/groups",
            json!({ "name": unique_group_name() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let group_id = parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    for member in members {
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

    group_id
}

async fn create_transaction(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/transactions", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}

async fn list_for_group(app: &Router, group_id: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/transactions?group_id={}", group_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}

#[tokio::test]
async fn test_shared_transaction_creates_equal_splits() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob", "carol"]).await;

    create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "300.00",
            "description": "Rent",
            "date": "2026-03-01T12:00:00Z",
            "is_shared": true,
            "paid_by": "alice"
        }),
    )
    .await;

    let listed = list_for_group(&app, &group_id).await;
    let transactions = listed.as_array().unwrap();
    assert_eq!(transactions.len(), 1);

    let splits = transactions[0]["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 3);

    let mut paid_count = 0;
    for split in splits {
        assert_eq!(split["amount"].as_str().unwrap().parse::<f64>().unwrap(), 100.0);
        if split["is_paid"].as_bool().unwrap() {
            paid_count += 1;
            assert_eq!(split["member_name"], "alice");
        }
    }
    assert_eq!(paid_count, 1);
}

#[tokio::test]
async fn test_uneven_split_rounds_without_redistribution() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob", "carol"]).await;

    create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "100.00",
            "description": "Groceries",
            "date": "2026-03-02T12:00:00Z",
            "is_shared": true,
            "paid_by": "bob"
        }),
    )
    .await;

    let listed = list_for_group(&app, &group_id).await;
    let splits = listed[0]["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 3);

    // 100 / 3 rounds to 33.33 per member; the remainder is NOT
    // redistributed, so the sum comes to 99.99.
    let sum: f64 = splits
        .iter()
        .map(|s| s["amount"].as_str().unwrap().parse::<f64>().unwrap())
        .sum();
    assert!((sum - 99.99).abs() < 0.001, "unexpected split sum: {}", sum);
}

#[tokio::test]
async fn test_non_shared_transaction_has_no_splits() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob"]).await;

    create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "42.50",
            "description": "Coffee",
            "date": "2026-03-03T08:00:00Z",
            "is_shared": false,
            "paid_by": "alice"
        }),
    )
    .await;

    let listed = list_for_group(&app, &group_id).await;
    assert_eq!(listed[0]["splits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_shared_transaction_with_zero_members_succeeds_without_splits() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &[]).await;

    create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "50.00",
            "description": "Supplies",
            "date": "2026-03-04T10:00:00Z",
            "is_shared": true,
            "paid_by": "alice"
        }),
    )
    .await;

    let listed = list_for_group(&app, &group_id).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["splits"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_shared_transaction_requires_existing_group() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());

    // Missing group_id
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/transactions",
            json!({
                "type": "expense",
                "amount": "10.00",
                "description": "x",
                "date": "2026-03-04T10:00:00Z",
                "is_shared": true,
                "paid_by": "alice"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown group
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/transactions",
            json!({
                "group_id": uuid::Uuid::new_v4(),
                "type": "expense",
                "amount": "10.00",
                "description": "x",
                "date": "2026-03-04T10:00:00Z",
                "is_shared": true,
                "paid_by": "alice"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_amounts_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());

    for amount in ["0", "-5.00", "abc"] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/transactions",
                json!({
                    "type": "expense",
                    "amount": amount,
                    "description": "bad amount",
                    "date": "2026-03-04T10:00:00Z",
                    "is_shared": false,
                    "paid_by": "alice"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "amount {:?} should be rejected",
            amount
        );
    }
}

#[tokio::test]
async fn test_update_amount_recomputes_splits_preserving_is_paid() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob", "carol"]).await;

    let transaction = create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "300.00",
            "description": "Rent",
            "date": "2026-03-01T12:00:00Z",
            "is_shared": true,
            "paid_by": "carol"
        }),
    )
    .await;
    let id = transaction["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/transactions/{}", id),
            json!({ "amount": "150.00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = list_for_group(&app, &group_id).await;
    let splits = listed[0]["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 3);
    for split in splits {
        assert_eq!(split["amount"].as_str().unwrap().parse::<f64>().unwrap(), 50.0);
        let is_payer = split["member_name"] == "carol";
        assert_eq!(split["is_paid"].as_bool().unwrap(), is_payer);
    }
}

#[tokio::test]
async fn test_update_unknown_transaction_404() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/transactions/{}", uuid::Uuid::new_v4()),
            json!({ "description": "nothing here" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_transaction_cascades_splits() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob"]).await;

    let transaction = create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "80.00",
            "description": "Utilities",
            "date": "2026-03-05T12:00:00Z",
            "is_shared": true,
            "paid_by": "alice"
        }),
    )
    .await;
    let id = transaction["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/transactions/{}", id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM transaction_splits WHERE transaction_id = $1::uuid",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);

    let listed = list_for_group(&app, &group_id).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_filters_by_type_and_category() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let group_id = create_group_with_members(&app, &["alice"]).await;

    for (kind, category, amount) in [
        ("expense", "food", "20.00"),
        ("expense", "travel", "35.00"),
        ("income", "salary", "1000.00"),
    ] {
        create_transaction(
            &app,
            json!({
                "group_id": group_id,
                "type": kind,
                "amount": amount,
                "description": format!("{} entry", category),
                "category": category,
                "date": "2026-03-06T12:00:00Z",
                "is_shared": false,
                "paid_by": "alice"
            }),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/transactions?group_id={}&type=income", group_id),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["type"], "income");

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/transactions?group_id={}&category=food", group_id),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["category"], "food");
}

#[tokio::test]
async fn test_transaction_created_event_broadcast_without_splits_payload() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;

    let broadcaster = Broadcaster::new();
    let app = create_test_app_with_broadcaster(test_config(), pool.clone(), broadcaster.clone());
    let group_id = create_group_with_members(&app, &["alice", "bob"]).await;

    // Subscribe after group setup so only the transaction event arrives
    let (_id, mut rx) = broadcaster.subscribe();

    create_transaction(
        &app,
        json!({
            "group_id": group_id,
            "type": "expense",
            "amount": "60.00",
            "description": "Dinner",
            "date": "2026-03-07T19:00:00Z",
            "is_shared": true,
            "paid_by": "bob"
        }),
    )
    .await;

    let message = rx.recv().await.expect("expected broadcast event");
    let envelope: serde_json::Value = serde_json::from_str(&message).unwrap();
    assert_eq!(envelope["event"], "transaction_created");
    assert!(envelope["timestamp"].is_string());

    // The event carries the bare transaction: it is emitted after the
    // transaction row is durable but before splits are written, so the
    // payload never includes them.
    assert_eq!(envelope["data"]["description"], "Dinner");
    assert!(envelope["data"].get("splits").is_none());
}
