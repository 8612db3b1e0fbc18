use chrono::Utc;

use super::interface::{AdminError, AdminRepository, OtpRepository};
use super::model::{Admin, OneTimeCode, OtpPurpose, OtpState};
use crate::error::StoreError;
use crate::services::{hashing, jwt::JwtService, mailer::OtpMailer, otp::OtpPolicy};
use crate::AppState;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Admin signup, login and password reset, each gated by a one-time code.
pub struct AdminService<'a> {
    admins: &'a dyn AdminRepository,
    otps: &'a dyn OtpRepository,
    mailer: &'a dyn OtpMailer,
    jwt_service: &'a JwtService,
    policy: OtpPolicy,
}

pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub admin: Admin,
}

impl<'a> AdminService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            admins: state.repositories.admins.as_ref(),
            otps: state.repositories.otps.as_ref(),
            mailer: state.mailer.as_ref(),
            jwt_service: &state.jwt_service,
            policy: state.otp_policy,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Admin, AdminError> {
        if self.admins.find_by_email(email).await?.is_some() {
            return Err(AdminError::EmailAlreadyExists);
        }

        let password_hash = hashing::hash_password(password).map_err(|e| AdminError::Internal(e.to_string()))?;
        let admin = Admin::new(email.to_string(), password_hash, Utc::now());

        match self.admins.create(&admin).await {
            Ok(()) => {}
            Err(StoreError::Duplicate) => return Err(AdminError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(admin_id = %admin.id, email = %admin.email, "admin account created");

        self.issue_code(&admin.email, OtpPurpose::Signup).await?;
        Ok(admin)
    }

    pub async fn verify_signup(&self, email: &str, code: &str) -> Result<(), AdminError> {
        self.redeem(email, OtpPurpose::Signup, code).await?;
        self.admins.set_verified(email, Utc::now()).await?;
        tracing::info!(%email, "admin account verified");
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), AdminError> {
        let admin = self.admins.find_by_email(email).await?;

        let password_hash = match &admin {
            Some(admin) => admin.password_hash.as_str(),
            None => hashing::dummy_password_hash().map_err(|e| AdminError::Internal(e.to_string()))?,
        };
        let is_valid = hashing::verify_password(password, password_hash)
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        let admin = match admin {
            Some(admin) if is_valid => admin,
            _ => return Err(AdminError::InvalidCredentials),
        };
        if !admin.verified {
            return Err(AdminError::NotVerified);
        }

        self.issue_code(email, OtpPurpose::Login).await
    }

    pub async fn verify_login(&self, email: &str, code: &str) -> Result<Session, AdminError> {
        self.redeem(email, OtpPurpose::Login, code).await?;

        self.admins.record_login(email, Utc::now()).await?;
        let admin = self
            .admins
            .find_by_email(email)
            .await?
            .ok_or(AdminError::InvalidCode)?;

        let token = self
            .jwt_service
            .create_session_token(&admin.id, &admin.email)
            .map_err(|e| AdminError::Internal(e.to_string()))?;
        tracing::info!(admin_id = %admin.id, "admin logged in");

        Ok(Session {
            token,
            expires_in: self.jwt_service.session_duration_secs(),
            admin,
        })
    }

    /// Succeeds for unknown emails too, so callers can't probe for accounts.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AdminError> {
        if self.admins.find_by_email(email).await?.is_none() {
            tracing::debug!(%email, "password reset requested for unknown email");
            return Ok(());
        }
        self.issue_code(email, OtpPurpose::PasswordReset).await
    }

    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<(), AdminError> {
        self.check(email, OtpPurpose::PasswordReset, code).await
    }

    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<(), AdminError> {
        let password_hash =
            hashing::hash_password(new_password).map_err(|e| AdminError::Internal(e.to_string()))?;

        self.redeem(email, OtpPurpose::PasswordReset, code).await?;
        self.admins.update_password(email, &password_hash, Utc::now()).await?;
        tracing::info!(%email, "admin password reset");
        Ok(())
    }

    /// Reissues a signup or reset code. Unknown or already-verified accounts are a silent no-op.
    pub async fn resend(&self, email: &str, purpose: OtpPurpose) -> Result<(), AdminError> {
        if purpose == OtpPurpose::Login {
            return Err(AdminError::Validation(
                "Login codes are reissued by logging in again".to_string(),
            ));
        }

        match self.admins.find_by_email(email).await? {
            Some(admin) if purpose == OtpPurpose::Signup && admin.verified => Ok(()),
            Some(_) => self.issue_code(email, purpose).await,
            None => Ok(()),
        }
    }

    pub async fn profile(&self, token: &str) -> Result<Admin, AdminError> {
        let data = self
            .jwt_service
            .verify_session_token(token)
            .map_err(|_| AdminError::Unauthorized)?;

        self.admins
            .find_by_email(&data.claims.email)
            .await?
            .filter(|admin| admin.id == data.claims.sub)
            .ok_or(AdminError::Unauthorized)
    }

    async fn issue_code(&self, email: &str, purpose: OtpPurpose) -> Result<(), AdminError> {
        let code = self.policy.generate();
        let otp = OneTimeCode::issue(email, purpose, &code, self.policy.ttl, Utc::now());

        self.otps.replace(&otp).await?;
        self.mailer.send_code(email, purpose, &code).await?;
        tracing::debug!(%email, %purpose, expires_at = %otp.expires_at, "OTP issued");
        Ok(())
    }

    /// Consumes the code on success; marks it expired if presented too late.
    async fn redeem(&self, email: &str, purpose: OtpPurpose, candidate: &str) -> Result<(), AdminError> {
        let otp = self
            .otps
            .find(email, purpose)
            .await?
            .ok_or(AdminError::InvalidCode)?;

        let (outcome, next) = otp.transition(candidate, Utc::now());
        if let Some(next) = next {
            let moved = self.otps.transition(&otp.id, OtpState::Issued, next).await?;
            // a concurrent request redeemed it first
            if !moved && outcome.is_ok() {
                return Err(AdminError::CodeUsed);
            }
        }
        outcome.map_err(AdminError::from)
    }

    /// Validates without consuming. Only the expiry transition is persisted.
    async fn check(&self, email: &str, purpose: OtpPurpose, candidate: &str) -> Result<(), AdminError> {
        let otp = self
            .otps
            .find(email, purpose)
            .await?
            .ok_or(AdminError::InvalidCode)?;

        let (outcome, next) = otp.transition(candidate, Utc::now());
        if next == Some(OtpState::Expired) {
            self.otps
                .transition(&otp.id, OtpState::Issued, OtpState::Expired)
                .await?;
        }
        outcome.map_err(AdminError::from)
    }
}
