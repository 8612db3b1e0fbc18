pub mod database;
pub mod environment;

pub use database::{init_db, DatabaseHealth, Repositories};
pub use environment::{Config, ConfigError, DatabaseBackend, Environment, OtpDelivery};
