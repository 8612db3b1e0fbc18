use serde::Serialize;

use super::model::DataRecord;

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: DataRecord,
}

#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<DataRecord>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}
