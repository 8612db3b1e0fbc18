use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

const DEV_JWT_SECRET: &str = "khazaana-development-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    MongoDb,
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(DatabaseBackend::MongoDb),
            "memory" => Ok(DatabaseBackend::Memory),
            other => Err(format!("unknown database backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpDelivery {
    Log,
    Smtp,
}

impl FromStr for OtpDelivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(OtpDelivery::Log),
            "smtp" | "email" => Ok(OtpDelivery::Smtp),
            other => Err(format!("unknown OTP delivery `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub frontend_origin: String,
    pub database_backend: DatabaseBackend,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub otp_ttl: Duration,
    pub otp_length: usize,
    pub otp_delivery: OtpDelivery,
    pub smtp: Option<SmtpSettings>,
    pub static_dir: PathBuf,
    pub body_limit_bytes: usize,
    pub auth_rate_limit_per_minute: u32,
    pub auth_rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 5000,
            frontend_origin: "http://localhost:3000".to_string(),
            database_backend: DatabaseBackend::MongoDb,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "khazaana".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl: Duration::from_secs(24 * 60 * 60),
            otp_ttl: Duration::from_secs(600),
            otp_length: 6,
            otp_delivery: OtpDelivery::Log,
            smtp: None,
            static_dir: PathBuf::from("frontend/build"),
            body_limit_bytes: 10 * 1024 * 1024,
            auth_rate_limit_per_minute: 60,
            auth_rate_limit_burst: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment: Environment = parse_or(&get, "APP_ENV", defaults.environment)?;

        let jwt_secret = match (get("JWT_SECRET"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Production) => return Err(ConfigError::Missing("JWT_SECRET")),
            (None, Environment::Development) => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                defaults.jwt_secret
            }
        };

        let otp_delivery: OtpDelivery = parse_or(&get, "OTP_DELIVERY", defaults.otp_delivery)?;
        let smtp = match otp_delivery {
            OtpDelivery::Log => None,
            OtpDelivery::Smtp => {
                let username = get("SMTP_USERNAME").ok_or(ConfigError::Missing("SMTP_USERNAME"))?;
                Some(SmtpSettings {
                    host: get("SMTP_HOST").ok_or(ConfigError::Missing("SMTP_HOST"))?,
                    password: get("SMTP_PASSWORD").ok_or(ConfigError::Missing("SMTP_PASSWORD"))?,
                    from: get("SMTP_FROM").unwrap_or_else(|| username.clone()),
                    username,
                })
            }
        };

        let frontend_origin = get("FRONTEND_URL")
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.frontend_origin);
        // credentialed CORS needs a concrete origin
        if frontend_origin == "*" {
            return Err(ConfigError::Invalid {
                key: "FRONTEND_URL",
                reason: "wildcard origin cannot be used with credentials".to_string(),
            });
        }

        let jwt_ttl_hours: u64 = parse_or(&get, "JWT_TTL_HOURS", 24u64)?;
        let jwt_ttl = jwt_ttl_hours
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_TTL_HOURS",
                reason: "value is too large".to_string(),
            })?;

        let otp_length: usize = parse_or(&get, "OTP_LENGTH", defaults.otp_length)?;
        if !(4..=10).contains(&otp_length) {
            return Err(ConfigError::Invalid {
                key: "OTP_LENGTH",
                reason: "must be between 4 and 10".to_string(),
            });
        }

        Ok(Self {
            environment,
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port)?,
            frontend_origin,
            database_backend: parse_or(&get, "DATABASE_BACKEND", defaults.database_backend)?,
            mongodb_uri: get("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: get("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            jwt_secret,
            jwt_ttl,
            otp_ttl: Duration::from_secs(parse_or(&get, "OTP_TTL_SECS", defaults.otp_ttl.as_secs())?),
            otp_length,
            otp_delivery,
            smtp,
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            body_limit_bytes: parse_or(&get, "BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            auth_rate_limit_per_minute: parse_or(
                &get,
                "AUTH_RATE_LIMIT_PER_MINUTE",
                defaults.auth_rate_limit_per_minute,
            )?,
            auth_rate_limit_burst: parse_or(&get, "AUTH_RATE_LIMIT_BURST", defaults.auth_rate_limit_burst)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
