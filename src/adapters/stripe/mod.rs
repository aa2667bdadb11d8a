//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe payment-intents
//! API, plus a configurable mock for testing.

mod gateway;
mod mock;

pub use gateway::{StripeConfig, StripeGateway};
pub use mock::MockPaymentGateway;
