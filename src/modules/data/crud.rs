use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::ReturnDocument,
    Collection, Database,
};
use serde_json::{Map, Value};

use super::interface::DataRepository;
use super::model::DataRecord;
use crate::config::database::{bson_datetime, chrono_datetime};
use crate::error::StoreResult;

const DATA: &str = "data";

fn to_document(record: &DataRecord) -> StoreResult<Document> {
    let mut document = doc! { "_id": record.id.as_str() };
    document.extend(bson::to_document(&record.fields)?);
    document.insert("createdAt", bson_datetime(record.created_at));
    document.insert("updatedAt", bson_datetime(record.updated_at));
    Ok(document)
}

fn timestamp(document: &mut Document, key: &str) -> DateTime<Utc> {
    match document.remove(key) {
        Some(Bson::DateTime(at)) => chrono_datetime(at),
        _ => DateTime::<Utc>::default(),
    }
}

fn from_document(mut document: Document) -> DataRecord {
    let id = match document.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(id)) => id,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let created_at = timestamp(&mut document, "createdAt");
    let updated_at = timestamp(&mut document, "updatedAt");
    document.remove("__v");

    let fields = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };

    DataRecord {
        id,
        fields,
        created_at,
        updated_at,
    }
}

/// Matches string ids written by this service and ObjectIds written by anything else.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [id, oid] } },
        Err(_) => doc! { "_id": id },
    }
}

pub struct RecordCrud {
    collection: Collection<Document>,
}

impl RecordCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(DATA),
        }
    }
}

#[async_trait]
impl DataRepository for RecordCrud {
    async fn insert(&self, record: &DataRecord) -> StoreResult<()> {
        self.collection.insert_one(to_document(record)?).await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<DataRecord>> {
        let documents: Vec<Document> = self.collection.find(doc! {}).await?.try_collect().await?;
        Ok(documents.into_iter().map(from_document).collect())
    }

    async fn find(&self, id: &str) -> StoreResult<Option<DataRecord>> {
        Ok(self.collection.find_one(id_filter(id)).await?.map(from_document))
    }

    async fn update(&self, id: &str, fields: Map<String, Value>, at: DateTime<Utc>) -> StoreResult<Option<DataRecord>> {
        let mut set = bson::to_document(&fields)?;
        set.insert("updatedAt", bson_datetime(at));

        let updated = self
            .collection
            .find_one_and_update(id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(from_document))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }
}
