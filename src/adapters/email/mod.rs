//! Email delivery adapters.
//!
//! Implementations of the `Mailer` port:
//!
//! - `resend` - HTTP delivery through the Resend API
//! - `mock` - Recording mock for tests

mod mock;
mod resend;

pub use mock::{MockMailer, SentMail};
pub use resend::ResendMailer;
