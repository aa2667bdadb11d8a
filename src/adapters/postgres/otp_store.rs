//! PostgreSQL implementation of OtpStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, OtpId, Timestamp, UserId};
use crate::domain::otp::{OneTimeCode, OtpCode, OtpPurpose};
use crate::ports::OtpStore;

/// PostgreSQL OTP store.
#[derive(Clone)]
pub struct PostgresOtpStore {
    pool: PgPool,
}

impl PostgresOtpStore {
    /// Creates a new PostgresOtpStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PostgresOtpStore {
    async fn supersede_and_insert(&self, code: &OneTimeCode) -> Result<(), DomainError> {
        // Invalidate-then-insert as one atomic unit. The partial unique
        // index on (email, purpose) WHERE NOT is_used makes a concurrent
        // second issuance retry-visible instead of silently double-active.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin issuance: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE otp_codes SET is_used = TRUE
            WHERE email = $1 AND purpose = $2 AND is_used = FALSE
            "#,
        )
        .bind(code.email())
        .bind(code.purpose().as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to supersede codes: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO otp_codes (
                id, email, code, purpose, expires_at, is_used, user_id, platform, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(code.id().as_uuid())
        .bind(code.email())
        .bind(code.code().as_str())
        .bind(code.purpose().as_str())
        .bind(code.expires_at().as_datetime())
        .bind(code.is_used())
        .bind(code.user_id().as_str())
        .bind(code.platform().as_str())
        .bind(code.created_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert code: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit issuance: {}", e)))?;

        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<Option<OneTimeCode>, DomainError> {
        // Single conditional UPDATE: match-and-consume cannot race, so a
        // code verifies at most once.
        let row = sqlx::query(
            r#"
            UPDATE otp_codes SET is_used = TRUE
            WHERE email = $1 AND code = $2 AND purpose = $3
              AND is_used = FALSE AND expires_at > $4
            RETURNING id, email, code, purpose, expires_at, user_id, platform, created_at
            "#,
        )
        .bind(email)
        .bind(code.as_str())
        .bind(purpose.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to consume code: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_code(row)?)),
            None => Ok(None),
        }
    }

    async fn count_active(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM otp_codes
            WHERE email = $1 AND purpose = $2 AND is_used = FALSE AND expires_at > $3
            "#,
        )
        .bind(email)
        .bind(purpose.as_str())
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to count codes: {}", e)))?;

        Ok(result.0 as u64)
    }
}

fn row_to_code(row: sqlx::postgres::PgRow) -> Result<OneTimeCode, DomainError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let code: String = row
        .try_get("code")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let purpose: String = row
        .try_get("purpose")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let expires_at: chrono::DateTime<chrono::Utc> = row
        .try_get("expires_at")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let platform: String = row
        .try_get("platform")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::database(format!("Bad otp row: {}", e)))?;

    Ok(OneTimeCode::from_parts(
        OtpId::from_uuid(id),
        email,
        OtpCode::new(code).map_err(|e| DomainError::database(format!("Bad stored code: {}", e)))?,
        purpose
            .parse()
            .map_err(|e| DomainError::database(format!("Bad stored purpose: {}", e)))?,
        Timestamp::from_datetime(expires_at),
        true, // just consumed
        UserId::new(user_id)
            .map_err(|e| DomainError::database(format!("Bad stored user id: {}", e)))?,
        platform
            .parse()
            .map_err(|e| DomainError::database(format!("Bad stored platform: {}", e)))?,
        Timestamp::from_datetime(created_at),
    ))
}
