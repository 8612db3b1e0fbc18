use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::services::hashing;

#[derive(Debug, Clone)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(email: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Signup,
    Login,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Signup => "signup",
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpPurpose::Signup),
            "login" => Ok(OtpPurpose::Login),
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            other => Err(format!("unknown OTP purpose `{other}`")),
        }
    }
}

/// Lifecycle of a one-time code: `Issued` moves to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpState {
    Issued,
    Consumed,
    Expired,
}

impl OtpState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpState::Issued => "issued",
            OtpState::Consumed => "consumed",
            OtpState::Expired => "expired",
        }
    }
}

impl FromStr for OtpState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(OtpState::Issued),
            "consumed" => Ok(OtpState::Consumed),
            "expired" => Ok(OtpState::Expired),
            other => Err(format!("unknown OTP state `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    Mismatch,
    Expired,
    AlreadyUsed,
}

/// A stored one-time code. Only the SHA-256 of the code is kept.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: String,
    pub email: String,
    pub purpose: OtpPurpose,
    pub code_hash: String,
    pub state: OtpState,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn issue(email: &str, purpose: OtpPurpose, code: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            purpose,
            code_hash: hashing::hash_code(code),
            state: OtpState::Issued,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks `candidate` without changing state.
    pub fn check(&self, candidate: &str, now: DateTime<Utc>) -> Result<(), OtpRejection> {
        match self.state {
            OtpState::Consumed => return Err(OtpRejection::AlreadyUsed),
            OtpState::Expired => return Err(OtpRejection::Expired),
            OtpState::Issued => {}
        }
        if self.is_expired_at(now) {
            return Err(OtpRejection::Expired);
        }
        if !hashing::verify_code(candidate, &self.code_hash) {
            return Err(OtpRejection::Mismatch);
        }
        Ok(())
    }

    /// Returns the state this code should move to after presenting `candidate`,
    /// or `None` if nothing changes (a mismatch leaves the code usable).
    pub fn transition(&self, candidate: &str, now: DateTime<Utc>) -> (Result<(), OtpRejection>, Option<OtpState>) {
        match self.check(candidate, now) {
            Ok(()) => (Ok(()), Some(OtpState::Consumed)),
            Err(OtpRejection::Expired) if self.state == OtpState::Issued => {
                (Err(OtpRejection::Expired), Some(OtpState::Expired))
            }
            Err(rejection) => (Err(rejection), None),
        }
    }
}
