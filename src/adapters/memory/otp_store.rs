//! In-memory `OtpStore`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::otp::{OneTimeCode, OtpCode, OtpPurpose};
use crate::ports::OtpStore;

/// In-memory OTP store.
///
/// A single mutex serializes `supersede_and_insert`, which is exactly the
/// critical section the at-most-one-active invariant needs.
#[derive(Default)]
pub struct InMemoryOtpStore {
    rows: Mutex<Vec<OneTimeCode>>,
}

impl InMemoryOtpStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored row (test inspection).
    pub fn rows(&self) -> Vec<OneTimeCode> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn supersede_and_insert(&self, code: &OneTimeCode) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.email() == code.email() && row.purpose() == code.purpose() && !row.is_used() {
                row.mark_used();
            }
        }
        rows.push(code.clone());
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<Option<OneTimeCode>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.email() == email
                && row.code() == code
                && row.purpose() == purpose
                && row.is_active(&now)
            {
                row.mark_used();
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn count_active(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.email() == email && row.purpose() == purpose && row.is_active(&now))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Platform, UserId};
    use crate::domain::otp::STANDARD_TTL_MINUTES;

    fn issue(email: &str) -> OneTimeCode {
        OneTimeCode::issue(
            email,
            OtpPurpose::EmailVerification,
            UserId::new("user-1").unwrap(),
            Platform::Web,
            STANDARD_TTL_MINUTES,
        )
    }

    #[tokio::test]
    async fn insert_supersedes_previous_active_rows() {
        let store = InMemoryOtpStore::new();
        let now = Timestamp::now();

        let first = issue("a@x.com");
        let second = issue("a@x.com");
        store.supersede_and_insert(&first).await.unwrap();
        store.supersede_and_insert(&second).await.unwrap();

        assert_eq!(
            store
                .count_active("a@x.com", OtpPurpose::EmailVerification, now)
                .await
                .unwrap(),
            1
        );

        // Only the second code is consumable.
        assert!(store
            .consume("a@x.com", first.code(), OtpPurpose::EmailVerification, now)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .consume("a@x.com", second.code(), OtpPurpose::EmailVerification, now)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn consume_is_single_use() {
        let store = InMemoryOtpStore::new();
        let now = Timestamp::now();
        let otp = issue("a@x.com");
        store.supersede_and_insert(&otp).await.unwrap();

        assert!(store
            .consume("a@x.com", otp.code(), OtpPurpose::EmailVerification, now)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .consume("a@x.com", otp.code(), OtpPurpose::EmailVerification, now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn expired_rows_do_not_consume() {
        let store = InMemoryOtpStore::new();
        let otp = issue("a@x.com");
        store.supersede_and_insert(&otp).await.unwrap();

        let after_expiry = otp.expires_at().plus_minutes(1);
        assert!(store
            .consume("a@x.com", otp.code(), OtpPurpose::EmailVerification, after_expiry)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn purposes_are_independent_scopes() {
        let store = InMemoryOtpStore::new();
        let now = Timestamp::now();

        let verification = issue("a@x.com");
        let reset = OneTimeCode::issue(
            "a@x.com",
            OtpPurpose::PasswordReset,
            UserId::new("user-1").unwrap(),
            Platform::Web,
            STANDARD_TTL_MINUTES,
        );
        store.supersede_and_insert(&verification).await.unwrap();
        store.supersede_and_insert(&reset).await.unwrap();

        // Issuing a reset code does not supersede the verification code.
        assert_eq!(
            store
                .count_active("a@x.com", OtpPurpose::EmailVerification, now)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .count_active("a@x.com", OtpPurpose::PasswordReset, now)
                .await
                .unwrap(),
            1
        );
    }
}
