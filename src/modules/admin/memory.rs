use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Mutex};

use super::interface::{AdminRepository, OtpRepository};
use super::model::{Admin, OneTimeCode, OtpPurpose, OtpState};
use crate::error::{StoreError, StoreResult};

/// Admins keyed by normalized email.
#[derive(Default)]
pub struct MemoryAdminStore {
    admins: Mutex<HashMap<String, Admin>>,
}

impl MemoryAdminStore {
    fn update<F>(&self, email: &str, apply: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Admin),
    {
        let mut admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        Ok(match admins.get_mut(email) {
            Some(admin) => {
                apply(admin);
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl AdminRepository for MemoryAdminStore {
    async fn create(&self, admin: &Admin) -> StoreResult<()> {
        let mut admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        if admins.contains_key(&admin.email) {
            return Err(StoreError::Duplicate);
        }
        admins.insert(admin.email.clone(), admin.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        Ok(admins.get(email).cloned())
    }

    async fn set_verified(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.update(email, |admin| {
            admin.verified = true;
            admin.updated_at = at;
        })
    }

    async fn update_password(&self, email: &str, password_hash: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.update(email, |admin| {
            admin.password_hash = password_hash.to_string();
            admin.updated_at = at;
        })
    }

    async fn record_login(&self, email: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        self.update(email, |admin| admin.last_login_at = Some(at))
    }
}

#[derive(Default)]
pub struct MemoryOtpStore {
    codes: Mutex<HashMap<(String, OtpPurpose), OneTimeCode>>,
}

#[async_trait]
impl OtpRepository for MemoryOtpStore {
    async fn replace(&self, code: &OneTimeCode) -> StoreResult<()> {
        let mut codes = self.codes.lock().unwrap_or_else(|e| e.into_inner());
        codes.insert((code.email.clone(), code.purpose), code.clone());
        Ok(())
    }

    async fn find(&self, email: &str, purpose: OtpPurpose) -> StoreResult<Option<OneTimeCode>> {
        let codes = self.codes.lock().unwrap_or_else(|e| e.into_inner());
        Ok(codes.get(&(email.to_string(), purpose)).cloned())
    }

    async fn transition(&self, id: &str, from: OtpState, to: OtpState) -> StoreResult<bool> {
        let mut codes = self.codes.lock().unwrap_or_else(|e| e.into_inner());
        match codes.values_mut().find(|code| code.id == id) {
            Some(code) if code.state == from => {
                code.state = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
