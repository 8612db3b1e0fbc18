use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::interface::DataError;

/// Keys owned by the server; stripped from client payloads.
const RESERVED_KEYS: [&str; 5] = ["id", "_id", "createdAt", "updatedAt", "__v"];

/// A schema-less document plus server-assigned identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataRecord {
    pub fn new(fields: Map<String, Value>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn merge(&mut self, fields: Map<String, Value>, now: DateTime<Utc>) {
        self.fields.extend(fields);
        self.updated_at = now;
    }
}

/// Turns a request body into storable fields: must be an object, reserved keys dropped,
/// and no key may start with `$` or contain `.`.
pub fn sanitize_payload(payload: Value) -> Result<Map<String, Value>, DataError> {
    let Value::Object(mut fields) = payload else {
        return Err(DataError::Validation("Request body must be a JSON object".to_string()));
    };

    for key in RESERVED_KEYS {
        fields.remove(key);
    }

    if let Some(key) = fields.keys().find(|k| k.is_empty() || k.starts_with('$') || k.contains('.')) {
        return Err(DataError::Validation(format!("Invalid field name `{key}`")));
    }

    Ok(fields)
}
