use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::model::DataRecord;
use crate::error::{ErrorResponse, StoreError, StoreResult, GENERIC_FAILURE};

#[async_trait]
pub trait DataRepository: Send + Sync {
    async fn insert(&self, record: &DataRecord) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<DataRecord>>;
    async fn find(&self, id: &str) -> StoreResult<Option<DataRecord>>;
    /// Merges `fields` into the record. `None` when no record has `id`.
    async fn update(&self, id: &str, fields: Map<String, Value>, at: DateTime<Utc>) -> StoreResult<Option<DataRecord>>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{0}")]
    Validation(String),

    #[error("Data not found")]
    NotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DataError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DataError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Store(e) => {
                tracing::error!(error = %e, "data request failed");
                GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
