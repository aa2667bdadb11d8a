//! Authentication types for the domain layer.
//!
//! These types represent an authenticated principal extracted from a JWT.
//! They have no provider dependencies - the `TokenVerifier` port populates
//! them from whatever claims the REST authentication layer signs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Role claim carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Host,
    SystemAdmin,
}

impl Role {
    /// Whether this role may use the administrative payment endpoints.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SystemAdmin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Authenticated principal extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The subject identity from the token.
    pub id: UserId,

    /// Email address from the token claims.
    pub email: String,

    /// Role claim used for capability checks at the orchestration layer.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    ///
    /// Typically called by a `TokenVerifier` adapter after successfully
    /// validating a token.
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }
}

/// Authentication errors that can occur during token validation.
///
/// Domain-centric: they describe what went wrong from the application's
/// perspective, not the token library's.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The handshake payload never arrived or was not an auth frame.
    #[error("Handshake not completed")]
    HandshakeIncomplete,
}

impl AuthError {
    /// Returns true if the client should obtain a fresh token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
