//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration (Stripe + offline method instructions)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key.
    ///
    /// Required; startup fails hard without it.
    pub stripe_secret_key: SecretString,

    /// Bound on a single gateway request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Account name returned with bank-transfer instructions
    pub bank_account_name: Option<String>,

    /// Account number returned with bank-transfer instructions
    pub bank_account_number: Option<String>,

    /// Bank name returned with bank-transfer instructions
    pub bank_name: Option<String>,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Get the gateway request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.stripe_secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_SECRET_KEY"));
        }
        // Verify key prefix for safety
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_secret_key: SecretString::new(key.to_string()),
            request_timeout_secs: default_request_timeout(),
            bank_account_name: None,
            bank_account_number: None,
            bank_name: None,
        }
    }

    #[test]
    fn test_mode_detection() {
        assert!(config("sk_test_xxx").is_test_mode());
        assert!(!config("sk_live_xxx").is_test_mode());
    }

    #[test]
    fn missing_key_is_invalid() {
        assert!(config("").validate().is_err());
    }

    #[test]
    fn wrong_prefix_is_invalid() {
        assert!(config("pk_test_xxx").validate().is_err());
    }

    #[test]
    fn valid_key_passes() {
        assert!(config("sk_test_abcd1234").validate().is_ok());
    }
}
