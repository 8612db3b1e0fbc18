use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};

use super::model::{Admin, OneTimeCode, OtpPurpose, OtpRejection, OtpState};
use crate::error::{ErrorResponse, StoreError, StoreResult, GENERIC_FAILURE};
use crate::services::mailer::MailerError;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the email is taken.
    async fn create(&self, admin: &Admin) -> StoreResult<()>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;
    async fn set_verified(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool>;
    async fn update_password(&self, email: &str, password_hash: &str, at: DateTime<Utc>) -> StoreResult<bool>;
    async fn record_login(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool>;
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Stores `code` as the only code for its (email, purpose), replacing any earlier one.
    async fn replace(&self, code: &OneTimeCode) -> StoreResult<()>;
    async fn find(&self, email: &str, purpose: OtpPurpose) -> StoreResult<Option<OneTimeCode>>;
    /// Compare-and-set on the stored state. Returns `false` if the code is gone or not in `from`.
    async fn transition(&self, id: &str, from: OtpState, to: OtpState) -> StoreResult<bool>;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),

    #[error("An admin with this email already exists")]
    EmailAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not verified. Please verify your email first")]
    NotVerified,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code has expired. Please request a new one")]
    CodeExpired,

    #[error("Verification code has already been used")]
    CodeUsed,

    #[error("Invalid or missing token")]
    Unauthorized,

    #[error("Failed to deliver verification code: {0}")]
    Delivery(#[from] MailerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OtpRejection> for AdminError {
    fn from(rejection: OtpRejection) -> Self {
        match rejection {
            OtpRejection::Mismatch => AdminError::InvalidCode,
            OtpRejection::Expired => AdminError::CodeExpired,
            OtpRejection::AlreadyUsed => AdminError::CodeUsed,
        }
    }
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotVerified => StatusCode::FORBIDDEN,
            Self::InvalidCode => StatusCode::UNAUTHORIZED,
            Self::CodeExpired => StatusCode::UNAUTHORIZED,
            Self::CodeUsed => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "admin request failed");
            GENERIC_FAILURE.to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
