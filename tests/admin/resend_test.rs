use axum::http::StatusCode;
use serde_json::json;

use khazaana::modules::admin::model::OtpPurpose;

use crate::common::{test_email, test_password, TestContext};

#[tokio::test]
async fn resend_signup_code_replaces_previous_code() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let first = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();

    ctx.server
        .post("/api/admin/resend-otp")
        .json(&json!({ "email": &email }))
        .await
        .assert_status_ok();
    let second = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();
    assert_eq!(ctx.mailer.sent_count(), 2);

    if first != second {
        ctx.server
            .post("/api/admin/verify-otp")
            .json(&json!({ "email": &email, "code": first }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    ctx.server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": second }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn resend_for_verified_or_unknown_account_sends_nothing() {
    let ctx = TestContext::new().await;
    let email = ctx.verified_admin().await;
    let before = ctx.mailer.sent_count();

    ctx.server
        .post("/api/admin/resend-otp")
        .json(&json!({ "email": &email }))
        .await
        .assert_status_ok();
    ctx.server
        .post("/api/admin/resend-otp")
        .json(&json!({ "email": test_email() }))
        .await
        .assert_status_ok();

    assert_eq!(ctx.mailer.sent_count(), before);
}

#[tokio::test]
async fn resend_login_code_is_rejected() {
    let ctx = TestContext::new().await;
    let email = ctx.verified_admin().await;

    ctx.server
        .post("/api/admin/resend-otp")
        .json(&json!({ "email": &email, "purpose": "login" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resend_password_reset_code() {
    let ctx = TestContext::new().await;
    let email = ctx.verified_admin().await;

    ctx.server
        .post("/api/admin/resend-otp")
        .json(&json!({ "email": &email, "purpose": "password_reset" }))
        .await
        .assert_status_ok();

    assert!(ctx.mailer.last_code(&email, OtpPurpose::PasswordReset).is_some());
}
