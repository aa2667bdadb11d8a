//! UserDirectory port - Minimal account lookups for the OTP flows.
//!
//! Full account CRUD is out of scope; issuance only needs to resolve an
//! email to a user and flip the verified flag after a successful
//! email-verification.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Role, UserId};

/// The slice of an account the OTP lifecycle reads.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
}

/// Port for account lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves an email address to an account, if one exists.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    /// Resolves a user id to an account, if one exists.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError>;

    /// Marks the account's email verified, recording the verification time.
    async fn mark_email_verified(&self, email: &str) -> Result<(), DomainError>;
}
