//! PostgreSQL implementation of BookingStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, PaymentId, UserId};
use crate::ports::BookingStore;

/// PostgreSQL booking store.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgresBookingStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, status, payment_ref FROM bookings WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch booking: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let bad = |e: &dyn std::fmt::Display| DomainError::database(format!("Bad booking row: {}", e));

        let id: uuid::Uuid = row.try_get("id").map_err(|e| bad(&e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| bad(&e))?;
        let status: String = row.try_get("status").map_err(|e| bad(&e))?;
        let payment_ref: Option<uuid::Uuid> = row.try_get("payment_ref").map_err(|e| bad(&e))?;

        Ok(Some(Booking {
            id: BookingId::from_uuid(id),
            user_id: UserId::new(user_id).map_err(|e| bad(&e))?,
            status: status.parse().map_err(|e| bad(&e))?,
            payment_ref: payment_ref.map(PaymentId::from_uuid),
        }))
    }

    async fn confirm_once(
        &self,
        id: &BookingId,
        payment_ref: PaymentId,
    ) -> Result<bool, DomainError> {
        // Compare-and-swap on the status: a booking confirms at most once no
        // matter how many SUCCESS updates race.
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = 'confirmed', payment_ref = $2
            WHERE id = $1 AND status <> 'confirmed'
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment_ref.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to confirm booking: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
