use axum::http::StatusCode;

use crate::common::TestContext;

#[tokio::test]
async fn me_returns_profile_for_valid_token() {
    let ctx = TestContext::new().await;
    let email = ctx.verified_admin().await;
    let token = ctx.login_token(&email).await;

    let response = ctx
        .server
        .get("/api/admin/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["admin"]["email"], email.as_str());
    assert!(body["admin"].get("passwordHash").is_none());
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/admin/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn me_with_garbage_token_is_unauthorized() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/api/admin/me")
        .authorization_bearer("not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
