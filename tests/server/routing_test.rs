use axum::{http::StatusCode, routing::get, Router};
use axum_test::TestServer;
use serde_json::json;

use crate::common::{test_config, test_email, test_password, TestContext};

async fn exploding_handler() -> &'static str {
    panic!("handler exploded")
}

#[tokio::test]
async fn api_index_lists_routes() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Welcome to Khazaana API");
    assert!(body["availableRoutes"].as_array().is_some_and(|routes| !routes.is_empty()));
}

#[tokio::test]
async fn unknown_api_route_returns_404_envelope() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/does-not-exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn wrong_method_on_admin_route_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/admin/signup").await;

    let status = response.status_code();
    assert!(status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn root_without_frontend_returns_welcome() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Welcome to Khazaana API");
}

#[tokio::test]
async fn handler_panic_returns_generic_500_envelope() {
    let app = khazaana::with_common_layers(
        Router::new().route("/explode", get(exploding_handler)),
        &test_config(),
    );
    let server = TestServer::new(app).expect("Failed to create test server");

    let response = server.get("/explode").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "success": false, "message": "Something went wrong!" }));
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}

#[tokio::test]
async fn wildcard_frontend_origin_still_starts() {
    let config = khazaana::config::Config {
        frontend_origin: "*".to_string(),
        ..test_config()
    };
    let ctx = TestContext::with_config(config).await;

    ctx.server.get("/api/health").await.assert_status_ok();
}

#[tokio::test]
async fn non_api_route_without_frontend_is_404() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/dashboard")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/health").await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn auth_routes_are_rate_limited() {
    let config = khazaana::config::Config {
        auth_rate_limit_per_minute: 1,
        auth_rate_limit_burst: 2,
        ..test_config()
    };
    let ctx = TestContext::with_config(config).await;
    let payload = json!({ "email": test_email(), "password": test_password() });

    for _ in 0..2 {
        let status = ctx.server.post("/api/admin/login").json(&payload).await.status_code();
        assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    let response = ctx.server.post("/api/admin/login").json(&payload).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);

    // data routes are not limited
    ctx.server.get("/api/data").await.assert_status_ok();
}
