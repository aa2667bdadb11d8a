//! Mailer port - Outbound email delivery.
//!
//! Template rendering is out of scope; the port speaks in terms of the
//! messages the OTP and payment flows need to send.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors from email delivery.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// The mail provider rejected the message.
    #[error("Mail provider rejected the message: {0}")]
    Rejected(String),

    /// Network-level failure reaching the provider.
    #[error("Mail provider unreachable: {0}")]
    Network(String),
}

impl From<MailError> for DomainError {
    fn from(err: MailError) -> Self {
        DomainError::new(ErrorCode::EmailDeliveryError, err.to_string())
    }
}

/// Port for sending the emails the core flows produce.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Emails an email-verification code.
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), MailError>;

    /// Emails a password-reset code (mobile flow).
    async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), MailError>;

    /// Emails a password-reset link (web flow); `token` is embedded in the
    /// reset URL.
    async fn send_password_reset_link(&self, to: &str, token: &str) -> Result<(), MailError>;

    /// Emails a payment receipt summary after a successful payment.
    async fn send_payment_receipt(
        &self,
        to: &str,
        amount: i64,
        currency: &str,
        payment_ref: &str,
    ) -> Result<(), MailError>;
}
