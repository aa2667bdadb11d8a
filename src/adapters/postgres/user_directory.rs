//! PostgreSQL implementation of UserDirectory.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::foundation::{DomainError, Role, UserId};
use crate::ports::{UserDirectory, UserRecord};

/// PostgreSQL user directory.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgresUserDirectory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, is_email_verified FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch user: {}", e)))?;

        row.map(row_to_record).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, is_email_verified FROM users WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch user: {}", e)))?;

        row.map(row_to_record).transpose()
    }

    async fn mark_email_verified(&self, email: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET is_email_verified = TRUE, email_verified_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to mark email verified: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::user_not_found());
        }

        Ok(())
    }
}

fn row_to_record(row: PgRow) -> Result<UserRecord, DomainError> {
    let bad = |e: &dyn std::fmt::Display| DomainError::database(format!("Bad user row: {}", e));

    let id: String = row.try_get("id").map_err(|e| bad(&e))?;
    let email: String = row.try_get("email").map_err(|e| bad(&e))?;
    let role: String = row.try_get("role").map_err(|e| bad(&e))?;
    let is_email_verified: bool = row.try_get("is_email_verified").map_err(|e| bad(&e))?;

    let role: Role =
        serde_json::from_value(serde_json::Value::String(role)).map_err(|e| bad(&e))?;

    Ok(UserRecord {
        id: UserId::new(id).map_err(|e| bad(&e))?,
        email,
        role,
        is_email_verified,
    })
}
