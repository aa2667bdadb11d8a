//! PostgreSQL store adapters.
//!
//! sqlx implementations of the persistence ports. The OTP store is where
//! the at-most-one-active invariant is enforced: issuance runs
//! invalidate-then-insert inside one transaction, backed by a partial
//! unique index on `(email, purpose) WHERE NOT is_used`, and consumption is
//! a single conditional UPDATE.

mod booking_store;
mod otp_store;
mod payment_store;
mod user_directory;

pub use booking_store::PostgresBookingStore;
pub use otp_store::PostgresOtpStore;
pub use payment_store::PostgresPaymentStore;
pub use user_directory::PostgresUserDirectory;
