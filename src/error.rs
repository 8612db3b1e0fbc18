use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Failure envelope returned by every error path: `{ "success": false, "message": ... }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub type ErrorReply = (StatusCode, Json<ErrorResponse>);

pub fn error_reply(status: StatusCode, message: impl Into<String>) -> ErrorReply {
    (status, Json(ErrorResponse::new(message)))
}

/// Message used for every 5xx so internals never reach the client.
pub const GENERIC_FAILURE: &str = "Something went wrong!";

pub fn internal_error() -> ErrorReply {
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
}

/// Errors raised by the repository layer, independent of backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document conversion failed: {0}")]
    Conversion(String),
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Conversion(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        StoreError::Conversion(e.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
