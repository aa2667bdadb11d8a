//! Email configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Resend)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: SecretString,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Application name used in message bodies
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Web frontend base URL (password-reset links)
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.expose_secret().starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

fn default_from_email() -> String {
    "noreply@stayline.app".to_string()
}

fn default_from_name() -> String {
    "Stayline".to_string()
}

fn default_app_name() -> String {
    "Stayline".to_string()
}

fn default_frontend_url() -> String {
    "https://stayline.app".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str) -> EmailConfig {
        EmailConfig {
            resend_api_key: SecretString::new(key.to_string()),
            from_email: default_from_email(),
            from_name: default_from_name(),
            app_name: default_app_name(),
            frontend_url: default_frontend_url(),
        }
    }

    #[test]
    fn from_header_formats() {
        assert_eq!(config("re_xxx").from_header(), "Stayline <noreply@stayline.app>");
    }

    #[test]
    fn key_prefix_is_checked() {
        assert!(config("re_xxx").validate().is_ok());
        assert!(config("sk_xxx").validate().is_err());
        assert!(config("").validate().is_err());
    }

    #[test]
    fn from_email_must_contain_at() {
        let mut cfg = config("re_xxx");
        cfg.from_email = "not-an-email".to_string();
        assert!(cfg.validate().is_err());
    }
}
