//! Resend email adapter.
//!
//! Sends plain-text messages through the Resend HTTP API. Template
//! rendering is out of scope; subjects and bodies are composed here.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::config::EmailConfig;
use crate::ports::{MailError, Mailer};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

const API_BASE_URL: &str = "https://api.resend.com";

/// Bound on a single delivery request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// `Mailer` backed by the Resend API.
pub struct ResendMailer {
    api_key: SecretString,
    from_header: String,
    app_name: String,
    frontend_url: String,
    api_base_url: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendMailer {
    /// Creates a mailer from the email configuration section.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.resend_api_key.clone(),
            from_header: config.from_header(),
            app_name: config.app_name.clone(),
            frontend_url: config.frontend_url.clone(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    async fn deliver(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError> {
        let url = format!("{}/emails", self.api_base_url);
        let body = SendRequest {
            from: &self.from_header,
            to: [to],
            subject,
            text,
        };

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, to = %to, "Mail provider rejected message");
            return Err(MailError::Rejected(format!("{}: {}", status, detail)));
        }

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let subject = format!("Verify your {} email", self.app_name);
        let text = format!(
            "Your email verification code is: {}\n\n\
             The code expires in 15 minutes. If you did not request it, you can ignore this email.",
            code
        );
        self.deliver(to, &subject, &text).await
    }

    async fn send_password_reset_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let subject = "Password Reset Request".to_string();
        let text = format!(
            "Your password reset code is: {}\n\n\
             The code expires in 15 minutes. If you did not request a reset, ignore this email.",
            code
        );
        self.deliver(to, &subject, &text).await
    }

    async fn send_password_reset_link(&self, to: &str, token: &str) -> Result<(), MailError> {
        let subject = "Password Reset Request".to_string();
        let reset_url = format!("{}/reset-password?token={}", self.frontend_url, token);
        let text = format!(
            "A password reset was requested for your {} account.\n\n\
             Reset your password here: {}\n\n\
             The link expires in 15 minutes. If you did not request a reset, ignore this email.",
            self.app_name, reset_url
        );
        self.deliver(to, &subject, &text).await
    }

    async fn send_payment_receipt(
        &self,
        to: &str,
        amount: i64,
        currency: &str,
        payment_ref: &str,
    ) -> Result<(), MailError> {
        let subject = "Payment Confirmation".to_string();
        let text = format!(
            "Your payment of {} {} was successful.\n\nReference: {}\n\nThank you for using {}.",
            amount,
            currency.to_uppercase(),
            payment_ref,
            self.app_name
        );
        self.deliver(to, &subject, &text).await
    }
}
