//! BookingStore port - Read/confirm access to bookings.
//!
//! Booking CRUD lives elsewhere; the payment core only needs to look a
//! booking up and confirm it exactly once when its payment succeeds.

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, PaymentId};

/// Port for the booking side effects of the payment lifecycle.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetches a booking by id.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError>;

    /// Confirms a booking and stores the payment reference, but only if it
    /// is not already confirmed (compare-and-swap on the status).
    ///
    /// Returns `true` when this call performed the confirmation, `false`
    /// when the booking was already confirmed. Callers rely on this for
    /// idempotence: two SUCCESS updates for the same payment must yield one
    /// `true` between them.
    async fn confirm_once(
        &self,
        id: &BookingId,
        payment_ref: PaymentId,
    ) -> Result<bool, DomainError>;
}
