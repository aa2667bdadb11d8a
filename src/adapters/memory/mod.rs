//! In-memory store adapters.
//!
//! Mutex-guarded implementations of the persistence ports, upholding the
//! same atomicity contracts as the PostgreSQL adapters (issuance is
//! serialized per store, consumption is single-use, booking confirmation is
//! compare-and-swap). They back the unit and integration tests and are
//! handy for local development without a database.

mod booking_store;
mod otp_store;
mod payment_store;
mod user_directory;

pub use booking_store::InMemoryBookingStore;
pub use otp_store::InMemoryOtpStore;
pub use payment_store::InMemoryPaymentStore;
pub use user_directory::InMemoryUserDirectory;
