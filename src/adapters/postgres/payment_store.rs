//! PostgreSQL implementation of PaymentStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, PaymentId, Platform, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentMetadata};
use crate::ports::PaymentStore;

/// PostgreSQL payment store.
#[derive(Clone)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new PostgresPaymentStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        let metadata = serde_json::to_value(payment.metadata())
            .map_err(|e| DomainError::database(format!("Failed to encode metadata: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, amount, currency, status, method,
                gateway_ref, description, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.user_id().as_str())
        .bind(payment.amount())
        .bind(payment.currency())
        .bind(payment.status().as_str())
        .bind(payment.method().as_str())
        .bind(payment.gateway_ref())
        .bind(payment.description())
        .bind(metadata)
        .bind(payment.created_at().as_datetime())
        .bind(payment.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert payment: {}", e)))?;

        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let metadata = serde_json::to_value(payment.metadata())
            .map_err(|e| DomainError::database(format!("Failed to encode metadata: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                gateway_ref = $3,
                description = $4,
                metadata = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(payment.id().as_uuid())
        .bind(payment.status().as_str())
        .bind(payment.gateway_ref())
        .bind(payment.description())
        .bind(metadata)
        .bind(payment.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update payment: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::payment_not_found(payment.id()));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, amount, currency, status, method,
                   gateway_ref, description, metadata, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch payment: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_payment(row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, platform: Option<Platform>) -> Result<Vec<Payment>, DomainError> {
        let rows = match platform {
            Some(platform) => {
                sqlx::query(
                    r#"
                    SELECT id, user_id, amount, currency, status, method,
                           gateway_ref, description, metadata, created_at, updated_at
                    FROM payments
                    WHERE metadata->>'platform' = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(platform.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, user_id, amount, currency, status, method,
                           gateway_ref, description, metadata, created_at, updated_at
                    FROM payments
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::database(format!("Failed to list payments: {}", e)))?;

        rows.into_iter().map(row_to_payment).collect()
    }
}

fn row_to_payment(row: sqlx::postgres::PgRow) -> Result<Payment, DomainError> {
    let bad = |e: &dyn std::fmt::Display| DomainError::database(format!("Bad payment row: {}", e));

    let id: uuid::Uuid = row.try_get("id").map_err(|e| bad(&e))?;
    let user_id: String = row.try_get("user_id").map_err(|e| bad(&e))?;
    let amount: i64 = row.try_get("amount").map_err(|e| bad(&e))?;
    let currency: String = row.try_get("currency").map_err(|e| bad(&e))?;
    let status: String = row.try_get("status").map_err(|e| bad(&e))?;
    let method: String = row.try_get("method").map_err(|e| bad(&e))?;
    let gateway_ref: Option<String> = row.try_get("gateway_ref").map_err(|e| bad(&e))?;
    let description: Option<String> = row.try_get("description").map_err(|e| bad(&e))?;
    let metadata: serde_json::Value = row.try_get("metadata").map_err(|e| bad(&e))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(|e| bad(&e))?;
    let updated_at: chrono::DateTime<chrono::Utc> =
        row.try_get("updated_at").map_err(|e| bad(&e))?;

    let metadata: PaymentMetadata = serde_json::from_value(metadata).map_err(|e| bad(&e))?;

    Ok(Payment::from_parts(
        PaymentId::from_uuid(id),
        UserId::new(user_id).map_err(|e| bad(&e))?,
        amount,
        currency,
        status.parse().map_err(|e| bad(&e))?,
        method.parse().map_err(|e| bad(&e))?,
        gateway_ref,
        description,
        metadata,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
