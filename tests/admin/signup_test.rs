use axum::http::StatusCode;
use serde_json::json;

use khazaana::modules::admin::interface::AdminRepository;
use khazaana::modules::admin::model::OtpPurpose;

use crate::common::{test_config, test_email, test_password, TestContext};

#[tokio::test]
async fn signup_creates_unverified_admin_and_sends_code() {
    let ctx = TestContext::new().await;
    let email = test_email();

    let response = ctx
        .server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let admin = ctx.repositories.admins.find_by_email(&email).await.unwrap().unwrap();
    assert!(!admin.verified);
    assert_ne!(admin.password_hash, test_password());
    assert!(ctx.mailer.last_code(&email, OtpPurpose::Signup).is_some());
    assert_eq!(ctx.mailer.sent_count(), 1);
}

#[tokio::test]
async fn signup_normalizes_email() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": email.to_uppercase(), "password": test_password() }))
        .await
        .assert_status(StatusCode::CREATED);

    assert!(ctx.repositories.admins.find_by_email(&email).await.unwrap().is_some());
}

#[tokio::test]
async fn signup_duplicate_email_conflicts() {
    let ctx = TestContext::new().await;
    let email = test_email();
    let payload = json!({ "email": &email, "password": test_password() });

    ctx.server.post("/api/admin/signup").json(&payload).await.assert_status(StatusCode::CREATED);
    let response = ctx.server.post("/api/admin/signup").json(&payload).await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn signup_rejects_invalid_input() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": "not-an-email", "password": test_password() }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": test_email(), "password": "short" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_with_missing_fields_uses_error_envelope() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/admin/signup")
        .json(&json!({ "email": test_email() }))
        .await;

    assert!(response.status_code().is_client_error());
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn verify_otp_marks_admin_verified_exactly_once() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let code = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();

    ctx.server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": &code }))
        .await
        .assert_status_ok();

    let admin = ctx.repositories.admins.find_by_email(&email).await.unwrap().unwrap();
    assert!(admin.verified);

    let replay = ctx
        .server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": &code }))
        .await;
    replay.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = replay.json();
    assert_eq!(body["message"], "Verification code has already been used");
}

#[tokio::test]
async fn verify_otp_accepts_otp_field_name() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let code = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();

    ctx.server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "otp": code }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn verify_otp_wrong_code_leaves_admin_unverified() {
    let ctx = TestContext::new().await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let code = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let response = ctx
        .server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": wrong }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid verification code");

    let admin = ctx.repositories.admins.find_by_email(&email).await.unwrap().unwrap();
    assert!(!admin.verified);

    // the right code still works after a miss
    ctx.server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": code }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn verify_otp_after_expiry_is_rejected() {
    let config = khazaana::config::Config {
        otp_ttl: std::time::Duration::ZERO,
        ..test_config()
    };
    let ctx = TestContext::with_config(config).await;
    let email = test_email();

    ctx.server
        .post("/api/admin/signup")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let code = ctx.mailer.last_code(&email, OtpPurpose::Signup).unwrap();

    let response = ctx
        .server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": &email, "code": code }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Verification code has expired. Please request a new one");

    let admin = ctx.repositories.admins.find_by_email(&email).await.unwrap().unwrap();
    assert!(!admin.verified);
}

#[tokio::test]
async fn verify_otp_for_unknown_email_is_invalid_code() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/api/admin/verify-otp")
        .json(&json!({ "email": test_email(), "code": "123456" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
