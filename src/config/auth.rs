//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Authentication configuration (shared JWT signing secret)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Signing secret shared with the REST authentication layer.
    ///
    /// Required; startup fails hard without it.
    pub jwt_secret: SecretString,

    /// Time a fresh real-time connection gets to complete its handshake,
    /// in seconds
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
}

impl AuthConfig {
    /// Get handshake timeout as Duration
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        if self.handshake_timeout_secs == 0 || self.handshake_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_handshake_timeout() -> u64 {
    10
}
