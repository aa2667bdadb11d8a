//! TokenVerifier port - Bearer credential validation.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Port for validating the bearer credential presented by REST requests and
/// by the real-time handshake.
///
/// Implementations verify the signature and expiry with the same secret and
/// algorithm as the REST authentication layer and extract the subject
/// identity from the claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validates a token, returning the authenticated principal.
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
