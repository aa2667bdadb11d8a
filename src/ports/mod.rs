//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OtpStore` - Persistence for one-time verification codes
//! - `PaymentStore` - Persistence for payment records
//! - `BookingStore` - Read/confirm access to bookings
//! - `UserDirectory` - Minimal account lookups the OTP flows need
//! - `PaymentGateway` - External card-payment provider
//! - `Mailer` - Outbound email delivery
//! - `TokenVerifier` - Bearer credential validation
//! - `Notifier` - Best-effort real-time notification delivery

mod booking_store;
mod mailer;
mod notifier;
mod otp_store;
mod payment_gateway;
mod payment_store;
mod token_verifier;
mod user_directory;

pub use booking_store::BookingStore;
pub use mailer::{MailError, Mailer};
pub use notifier::{BroadcastEvent, Notification, NotificationEnvelope, Notifier};
pub use otp_store::OtpStore;
pub use payment_gateway::{CreateIntentRequest, GatewayError, PaymentGateway, PaymentIntent};
pub use payment_store::PaymentStore;
pub use token_verifier::TokenVerifier;
pub use user_directory::{UserDirectory, UserRecord};
