//! In-memory `BookingStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{BookingId, DomainError, PaymentId};
use crate::ports::BookingStore;

/// In-memory booking store.
#[derive(Default)]
pub struct InMemoryBookingStore {
    rows: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a booking (test setup).
    pub fn seed(&self, booking: Booking) {
        self.rows.lock().unwrap().insert(booking.id, booking);
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn confirm_once(
        &self,
        id: &BookingId,
        payment_ref: PaymentId,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(id) {
            Some(booking) if booking.status != BookingStatus::Confirmed => {
                booking.status = BookingStatus::Confirmed;
                booking.payment_ref = Some(payment_ref);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
