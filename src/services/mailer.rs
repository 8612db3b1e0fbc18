use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::config::{environment::SmtpSettings, Config, OtpDelivery};
use crate::modules::admin::model::OtpPurpose;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0} transport is not configured")]
    NotConfigured(&'static str),
}

/// Delivers one-time codes to an admin's contact channel.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_code(&self, email: &str, purpose: OtpPurpose, code: &str) -> Result<(), MailerError>;
}

pub fn build_mailer(config: &Config) -> Result<Arc<dyn OtpMailer>, MailerError> {
    match config.otp_delivery {
        OtpDelivery::Log => Ok(Arc::new(LogMailer)),
        OtpDelivery::Smtp => {
            let settings = config.smtp.as_ref().ok_or(MailerError::NotConfigured("smtp"))?;
            Ok(Arc::new(SmtpMailer::new(settings)?))
        }
    }
}

fn subject(purpose: OtpPurpose) -> &'static str {
    match purpose {
        OtpPurpose::Signup => "Verify your Khazaana admin account",
        OtpPurpose::Login => "Your Khazaana login code",
        OtpPurpose::PasswordReset => "Reset your Khazaana password",
    }
}

/// Development transport: writes the code to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_code(&self, email: &str, purpose: OtpPurpose, code: &str) -> Result<(), MailerError> {
        tracing::info!(%email, %purpose, %code, "OTP issued (log delivery)");
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailerError> {
        let credentials = Credentials::new(settings.username.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: settings.from.parse()?,
        })
    }
}

#[async_trait]
impl OtpMailer for SmtpMailer {
    async fn send_code(&self, email: &str, purpose: OtpPurpose, code: &str) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.parse()?)
            .subject(subject(purpose))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your verification code is {code}.\n\nIf you did not request this, you can ignore this email."
            ))?;

        self.transport.send(message).await?;
        tracing::debug!(%email, %purpose, "OTP email sent");
        Ok(())
    }
}
