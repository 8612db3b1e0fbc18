use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::modules::admin::{
    interface::AdminError,
    schema::{
        EmailRequest, LoginRequest, MessageResponse, ProfileResponse, ResendOtpRequest,
        ResetPasswordRequest, SessionResponse, SignupRequest, VerifyOtpRequest,
    },
    service::{normalize_email, AdminService},
};
use crate::services::extract::AppJson;
use crate::AppState;

type MessageResult = Result<(StatusCode, Json<MessageResponse>), AdminError>;

const CODE_SENT: &str = "If an account exists for this email, a verification code has been sent";

fn validate(req: &impl Validate) -> Result<(), AdminError> {
    req.validate().map_err(|e| AdminError::Validation(e.to_string()))
}

fn ok(message: impl Into<String>) -> MessageResult {
    Ok((StatusCode::OK, Json(MessageResponse::ok(message))))
}

pub async fn signup(State(state): State<Arc<AppState>>, AppJson(req): AppJson<SignupRequest>) -> MessageResult {
    validate(&req)?;

    let admin = AdminService::new(&state)
        .signup(&normalize_email(&req.email), &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok(format!(
            "Account created. A verification code has been sent to {}",
            admin.email
        ))),
    ))
}

pub async fn verify_otp(State(state): State<Arc<AppState>>, AppJson(req): AppJson<VerifyOtpRequest>) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .verify_signup(&normalize_email(&req.email), &req.code)
        .await?;

    ok("Email verified successfully. You can now log in")
}

pub async fn resend_otp(State(state): State<Arc<AppState>>, AppJson(req): AppJson<ResendOtpRequest>) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .resend(&normalize_email(&req.email), req.purpose)
        .await?;

    ok(CODE_SENT)
}

pub async fn login(State(state): State<Arc<AppState>>, AppJson(req): AppJson<LoginRequest>) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .login(&normalize_email(&req.email), &req.password)
        .await?;

    ok("A login code has been sent to your email")
}

pub async fn verify_login_otp(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AdminError> {
    validate(&req)?;

    let session = AdminService::new(&state)
        .verify_login(&normalize_email(&req.email), &req.code)
        .await?;

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            success: true,
            message: "Login successful",
            token: session.token,
            token_type: "Bearer",
            expires_in: session.expires_in,
            admin: session.admin.into(),
        }),
    ))
}

pub async fn forgot_password(State(state): State<Arc<AppState>>, AppJson(req): AppJson<EmailRequest>) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .forgot_password(&normalize_email(&req.email))
        .await?;

    ok(CODE_SENT)
}

pub async fn verify_forgot_password_otp(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<VerifyOtpRequest>,
) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .verify_reset_code(&normalize_email(&req.email), &req.code)
        .await?;

    ok("Code verified. You can now set a new password")
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> MessageResult {
    validate(&req)?;

    AdminService::new(&state)
        .reset_password(&normalize_email(&req.email), &req.code, &req.new_password)
        .await?;

    ok("Password reset successfully")
}

pub async fn me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<ProfileResponse>, AdminError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AdminError::Unauthorized)?;

    let admin = AdminService::new(&state).profile(token).await?;

    Ok(Json(ProfileResponse {
        success: true,
        admin: admin.into(),
    }))
}
