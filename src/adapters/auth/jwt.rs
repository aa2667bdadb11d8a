//! JWT token verification.
//!
//! Verifies the same HS256 tokens the REST authentication layer signs: the
//! subject claim carries the user id, `email` and `role` ride along, and
//! expiry is enforced by the library's validation.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::TokenVerifier;

/// Claims carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,

    /// Account email.
    pub email: String,

    /// Role claim for capability checks.
    #[serde(default)]
    pub role: Role,

    /// Expiry (seconds since epoch).
    pub exp: i64,

    /// Issued-at (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
}

/// `TokenVerifier` backed by `jsonwebtoken` and a shared secret.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Creates a verifier over the shared signing secret.
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let user_id = UserId::new(data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(
            user_id,
            data.claims.email,
            data.claims.role,
        ))
    }
}
