//! In-memory `PaymentStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, Platform};
use crate::domain::payment::Payment;
use crate::ports::PaymentStore;

/// In-memory payment store.
#[derive(Default)]
pub struct InMemoryPaymentStore {
    rows: Mutex<HashMap<PaymentId, Payment>>,
}

impl InMemoryPaymentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        self.rows
            .lock()
            .unwrap()
            .insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&payment.id()) {
            return Err(DomainError::payment_not_found(payment.id()));
        }
        rows.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn list(&self, platform: Option<Platform>) -> Result<Vec<Payment>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut payments: Vec<Payment> = rows
            .values()
            .filter(|p| platform.map_or(true, |pf| p.metadata().platform == pf))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(payments)
    }
}
