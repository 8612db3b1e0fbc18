use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{self, doc, DateTime as BsonDateTime},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

use super::interface::{AdminRepository, OtpRepository};
use super::model::{Admin, OneTimeCode, OtpPurpose, OtpState};
use crate::config::database::{bson_datetime, chrono_datetime, is_duplicate_key};
use crate::error::{StoreError, StoreResult};

const ADMINS: &str = "admins";
const OTPS: &str = "otps";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_login_at: Option<BsonDateTime>,
    created_at: BsonDateTime,
    updated_at: BsonDateTime,
}

impl From<&Admin> for AdminDocument {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
            is_verified: admin.verified,
            last_login_at: admin.last_login_at.map(bson_datetime),
            created_at: bson_datetime(admin.created_at),
            updated_at: bson_datetime(admin.updated_at),
        }
    }
}

impl From<AdminDocument> for Admin {
    fn from(doc: AdminDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            password_hash: doc.password_hash,
            verified: doc.is_verified,
            last_login_at: doc.last_login_at.map(chrono_datetime),
            created_at: chrono_datetime(doc.created_at),
            updated_at: chrono_datetime(doc.updated_at),
        }
    }
}

pub struct AdminCrud {
    collection: Collection<AdminDocument>,
}

impl AdminCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ADMINS),
        }
    }

    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn set_fields(&self, email: &str, fields: bson::Document) -> StoreResult<bool> {
        let result = self
            .collection
            .update_one(doc! { "email": email }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl AdminRepository for AdminCrud {
    async fn create(&self, admin: &Admin) -> StoreResult<()> {
        match self.collection.insert_one(AdminDocument::from(admin)).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email })
            .await?
            .map(Admin::from))
    }

    async fn set_verified(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.set_fields(email, doc! { "isVerified": true, "updatedAt": bson_datetime(at) })
            .await
    }

    async fn update_password(&self, email: &str, password_hash: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.set_fields(
            email,
            doc! { "passwordHash": password_hash, "updatedAt": bson_datetime(at) },
        )
        .await
    }

    async fn record_login(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.set_fields(email, doc! { "lastLoginAt": bson_datetime(at) }).await
    }
}

/// One document per (email, purpose). `codeId` changes on every issuance while Mongo's `_id` stays put.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtpDocument {
    code_id: String,
    email: String,
    purpose: OtpPurpose,
    code_hash: String,
    state: OtpState,
    expires_at: BsonDateTime,
    created_at: BsonDateTime,
}

impl From<&OneTimeCode> for OtpDocument {
    fn from(code: &OneTimeCode) -> Self {
        Self {
            code_id: code.id.clone(),
            email: code.email.clone(),
            purpose: code.purpose,
            code_hash: code.code_hash.clone(),
            state: code.state,
            expires_at: bson_datetime(code.expires_at),
            created_at: bson_datetime(code.created_at),
        }
    }
}

impl From<OtpDocument> for OneTimeCode {
    fn from(doc: OtpDocument) -> Self {
        Self {
            id: doc.code_id,
            email: doc.email,
            purpose: doc.purpose,
            code_hash: doc.code_hash,
            state: doc.state,
            expires_at: chrono_datetime(doc.expires_at),
            created_at: chrono_datetime(doc.created_at),
        }
    }
}

pub struct OtpCrud {
    collection: Collection<OtpDocument>,
}

impl OtpCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(OTPS),
        }
    }

    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1, "purpose": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl OtpRepository for OtpCrud {
    async fn replace(&self, code: &OneTimeCode) -> StoreResult<()> {
        let fields = bson::to_document(&OtpDocument::from(code))?;
        self.collection
            .update_one(
                doc! { "email": code.email.as_str(), "purpose": code.purpose.as_str() },
                doc! { "$set": fields },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find(&self, email: &str, purpose: OtpPurpose) -> StoreResult<Option<OneTimeCode>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email, "purpose": purpose.as_str() })
            .await?
            .map(OneTimeCode::from))
    }

    async fn transition(&self, id: &str, from: OtpState, to: OtpState) -> StoreResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "codeId": id, "state": from.as_str() },
                doc! { "$set": { "state": to.as_str() } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}
