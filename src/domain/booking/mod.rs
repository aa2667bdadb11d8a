//! Booking entity consumed by the payment confirmation cascade.
//!
//! Bookings are owned by the (out-of-scope) booking CRUD layer; the payment
//! core only reads them and confirms them as a side effect of a successful
//! payment. `CONFIRMED` must be reachable exactly once per booking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{BookingId, PaymentId, UserId};

/// Booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Returns the wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownBookingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownBookingStatus(other.to_string())),
        }
    }
}

/// Error for unrecognized booking status strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBookingStatus(pub String);

impl fmt::Display for UnknownBookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown booking status '{}'", self.0)
    }
}

impl std::error::Error for UnknownBookingStatus {}

/// The slice of a booking the payment core needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub status: BookingStatus,
    /// Payment that confirmed this booking, once confirmed.
    pub payment_ref: Option<PaymentId>,
}

impl Booking {
    /// Whether the confirmation cascade still applies to this booking.
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }

    #[test]
    fn confirmed_flag_tracks_status() {
        let booking = Booking {
            id: BookingId::new(),
            user_id: UserId::new("user-1").unwrap(),
            status: BookingStatus::Pending,
            payment_ref: None,
        };
        assert!(!booking.is_confirmed());
    }
}
