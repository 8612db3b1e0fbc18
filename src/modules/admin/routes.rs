use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(controller::signup))
        .route("/verify-otp", post(controller::verify_otp))
        .route("/resend-otp", post(controller::resend_otp))
        .route("/login", post(controller::login))
        .route("/verify-login-otp", post(controller::verify_login_otp))
        .route("/forgot-password", post(controller::forgot_password))
        .route(
            "/verify-forgot-password-otp",
            post(controller::verify_forgot_password_otp),
        )
        .route("/reset-password", post(controller::reset_password))
        .route("/me", get(controller::me))
}
