//! PaymentStore port - Persistence for payment records.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, Platform};
use crate::domain::payment::Payment;

/// Port for payment persistence.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a freshly created payment.
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Persists the current state of an existing payment.
    ///
    /// Errors with `PaymentNotFound` when the row does not exist.
    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Fetches a payment by id.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Lists payments, optionally filtered by the submitting platform,
    /// newest first.
    async fn list(&self, platform: Option<Platform>) -> Result<Vec<Payment>, DomainError>;
}
