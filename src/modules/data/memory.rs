use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Mutex;

use super::interface::DataRepository;
use super::model::DataRecord;
use crate::error::StoreResult;

/// Records in insertion order.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<DataRecord>>,
}

#[async_trait]
impl DataRepository for MemoryRecordStore {
    async fn insert(&self, record: &DataRecord) -> StoreResult<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record.clone());
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<DataRecord>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.clone())
    }

    async fn find(&self, id: &str) -> StoreResult<Option<DataRecord>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, id: &str, fields: Map<String, Value>, at: DateTime<Utc>) -> StoreResult<Option<DataRecord>> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            record.merge(fields, at);
            record.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }
}
