use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::modules::data::{
    interface::DataError,
    model::{sanitize_payload, DataRecord},
    schema::{DeleteResponse, RecordListResponse, RecordResponse},
};
use crate::services::extract::AppJson;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<RecordListResponse>, DataError> {
    let records = state.repositories.records.list().await?;

    Ok(Json(RecordListResponse {
        success: true,
        count: records.len(),
        data: records,
    }))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>, DataError> {
    let record = state
        .repositories
        .records
        .find(&id)
        .await?
        .ok_or(DataError::NotFound)?;

    Ok(Json(RecordResponse {
        success: true,
        message: None,
        data: record,
    }))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<Value>,
) -> Result<(StatusCode, Json<RecordResponse>), DataError> {
    let record = DataRecord::new(sanitize_payload(payload)?, Utc::now());
    state.repositories.records.insert(&record).await?;
    tracing::debug!(record_id = %record.id, "data record created");

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            success: true,
            message: Some("Data created successfully"),
            data: record,
        }),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<Value>,
) -> Result<Json<RecordResponse>, DataError> {
    let fields = sanitize_payload(payload)?;
    let record = state
        .repositories
        .records
        .update(&id, fields, Utc::now())
        .await?
        .ok_or(DataError::NotFound)?;

    Ok(Json(RecordResponse {
        success: true,
        message: Some("Data updated successfully"),
        data: record,
    }))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, DataError> {
    if !state.repositories.records.delete(&id).await? {
        return Err(DataError::NotFound);
    }
    tracing::debug!(record_id = %id, "data record deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Data deleted successfully",
    }))
}
