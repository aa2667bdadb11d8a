//! Application layer - Orchestrators composing the core components.
//!
//! Services here wire the domain state machines to their collaborators
//! (stores, gateway, mailer, notifier) behind ports. They carry no domain
//! rules of their own beyond sequencing and delivery policy.

mod otp_service;
mod payment_service;

pub use otp_service::OtpService;
pub use payment_service::{
    BankTransferDetails, PaymentInstructions, PaymentReceipt, PaymentService,
    ProcessPaymentRequest, ReceiptFormat,
};
