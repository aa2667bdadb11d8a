//! OtpStore port - Persistence for one-time verification codes.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::otp::{OneTimeCode, OtpCode, OtpPurpose};

/// Port for storing and consuming one-time codes.
///
/// Implementations must uphold the at-most-one-active invariant: after
/// `supersede_and_insert` completes, the inserted row is the only
/// `is_used = false` row for its (email, purpose) scope, even under
/// concurrent issuance. The PostgreSQL adapter does this with a transaction
/// plus a partial unique index; the in-memory adapter serializes on a mutex.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Marks every unused code for `(code.email, code.purpose)` as used,
    /// then inserts `code`, as a single atomic unit.
    async fn supersede_and_insert(&self, code: &OneTimeCode) -> Result<(), DomainError>;

    /// Atomically consumes the active code matching all of
    /// {email, code, purpose, unused, unexpired at `now`}.
    ///
    /// Returns the consumed row, or `None` when nothing matched - callers
    /// map `None` to the single generic invalid-or-expired condition.
    /// Consumption is single-use: a second call with the same arguments
    /// returns `None`.
    async fn consume(
        &self,
        email: &str,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<Option<OneTimeCode>, DomainError>;

    /// Counts unused, unexpired codes for a scope. Diagnostic/testing aid.
    async fn count_active(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<u64, DomainError>;
}
