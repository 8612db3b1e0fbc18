use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::ClientOptions,
    Client, Database,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::config::{Config, DatabaseBackend};
use crate::error::StoreResult;
use crate::modules::admin::{
    crud::{AdminCrud, OtpCrud},
    interface::{AdminRepository, OtpRepository},
    memory::{MemoryAdminStore, MemoryOtpStore},
};
use crate::modules::data::{crud::RecordCrud, interface::DataRepository, memory::MemoryRecordStore};

const PING_TIMEOUT: Duration = Duration::from_secs(2);
const DUPLICATE_KEY: i32 = 11000;

pub async fn init_db(uri: &str, database: &str) -> StoreResult<Database> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some("khazaana".to_string());
    options.server_selection_timeout = Some(Duration::from_secs(5));

    let client = Client::with_options(options)?;
    let db = client.database(database);
    db.run_command(doc! { "ping": 1 }).await?;

    Ok(db)
}

pub fn bson_datetime(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

pub fn chrono_datetime(at: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

pub fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

/// Liveness of the backing store, reported by `/api/health`.
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    async fn is_connected(&self) -> bool;
}

pub struct MongoHealth {
    db: Database,
}

impl MongoHealth {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DatabaseHealth for MongoHealth {
    async fn is_connected(&self) -> bool {
        matches!(
            tokio::time::timeout(PING_TIMEOUT, self.db.run_command(doc! { "ping": 1 })).await,
            Ok(Ok(_))
        )
    }
}

/// Connectivity flag for the in-memory backend. Always connected unless toggled.
pub struct MemoryHealth {
    connected: AtomicBool,
}

impl MemoryHealth {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl Default for MemoryHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseHealth for MemoryHealth {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Every repository the handlers need, behind trait objects so the backend is chosen at startup.
#[derive(Clone)]
pub struct Repositories {
    pub admins: Arc<dyn AdminRepository>,
    pub otps: Arc<dyn OtpRepository>,
    pub records: Arc<dyn DataRepository>,
    pub health: Arc<dyn DatabaseHealth>,
}

impl Repositories {
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        match config.database_backend {
            DatabaseBackend::MongoDb => {
                let db = init_db(&config.mongodb_uri, &config.mongodb_database).await?;
                tracing::info!(database = %config.mongodb_database, "Connected to MongoDB");
                Self::mongo(db).await
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory store, data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn mongo(db: Database) -> StoreResult<Self> {
        let admins = AdminCrud::new(&db);
        let otps = OtpCrud::new(&db);
        admins.ensure_indexes().await?;
        otps.ensure_indexes().await?;

        Ok(Self {
            admins: Arc::new(admins),
            otps: Arc::new(otps),
            records: Arc::new(RecordCrud::new(&db)),
            health: Arc::new(MongoHealth::new(db)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            admins: Arc::new(MemoryAdminStore::default()),
            otps: Arc::new(MemoryOtpStore::default()),
            records: Arc::new(MemoryRecordStore::default()),
            health: Arc::new(MemoryHealth::new()),
        }
    }
}
