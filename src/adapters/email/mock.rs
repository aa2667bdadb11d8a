//! Recording mock mailer for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{MailError, Mailer};

/// A message the mock "sent".
#[derive(Debug, Clone, PartialEq)]
pub enum SentMail {
    VerificationCode { to: String, code: String },
    PasswordResetCode { to: String, code: String },
    PasswordResetLink { to: String, token: String },
    PaymentReceipt { to: String, amount: i64, currency: String, payment_ref: String },
}

/// Mock `Mailer` that records every message.
#[derive(Default, Clone)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockMailer {
    /// Creates a mock that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery fail with a provider rejection.
    pub fn failing(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, mail: SentMail) -> Result<(), MailError> {
        if *self.fail.lock().unwrap() {
            return Err(MailError::Rejected("mock failure".to_string()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        self.record(SentMail::VerificationCode {
            to: to.to_string(),
            code: code.to_string(),
        })
    }

    async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        self.record(SentMail::PasswordResetCode {
            to: to.to_string(),
            code: code.to_string(),
        })
    }

    async fn send_password_reset_link(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.record(SentMail::PasswordResetLink {
            to: to.to_string(),
            token: token.to_string(),
        })
    }

    async fn send_payment_receipt(
        &self,
        to: &str,
        amount: i64,
        currency: &str,
        payment_ref: &str,
    ) -> Result<(), MailError> {
        self.record(SentMail::PaymentReceipt {
            to: to.to_string(),
            amount,
            currency: currency.to_string(),
            payment_ref: payment_ref.to_string(),
        })
    }
}
