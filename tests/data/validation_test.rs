use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

#[tokio::test]
async fn create_rejects_non_object_body() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/api/data").json(&json!([1, 2, 3])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_rejects_operator_keys() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/data")
        .json(&json!({ "$where": "1 == 1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/data")
        .json(&json!({ "a.b": 1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/data")
        .json(&json!({ "id": "chosen", "_id": "chosen", "name": "Pepper" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_ne!(body["data"]["id"], "chosen");
    assert!(body["data"].get("_id").is_none());
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/data")
        .text("{ not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = khazaana::config::Config {
        body_limit_bytes: 64,
        ..crate::common::test_config()
    };
    let ctx = TestContext::with_config(config).await;

    let response = ctx
        .server
        .post("/api/data")
        .json(&json!({ "blob": "x".repeat(1024) }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}
