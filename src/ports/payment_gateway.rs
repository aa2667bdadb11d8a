//! PaymentGateway port - External card-payment provider.
//!
//! The gateway is consulted once per card payment to create a payment
//! intent; offline methods never touch it. Status updates arrive later
//! through the administrative path, so there is no webhook surface here.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, Platform};

/// Request to open a payment intent with the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntentRequest {
    /// Amount in major currency units; adapters convert to the provider's
    /// minor-unit convention.
    pub amount: i64,

    /// ISO currency code, lowercase (e.g. "usd").
    pub currency: String,

    /// Platform the payment was submitted from; selects the provider-side
    /// payment method types.
    pub platform: Platform,
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    /// Provider's intent reference (stored as the payment's gateway_ref).
    pub id: String,

    /// Client secret the frontend uses to complete the payment.
    pub client_secret: String,
}

/// Errors from the payment gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The provider rejected the request.
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    /// Network-level failure reaching the provider.
    #[error("Gateway unreachable: {0}")]
    Network(String),

    /// The bounded request timeout elapsed.
    #[error("Gateway request timed out")]
    Timeout,

    /// The provider rejected our credentials.
    #[error("Gateway authentication failed")]
    Authentication,

    /// The provider answered with something we could not interpret.
    #[error("Gateway returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout)
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::new(ErrorCode::GatewayError, err.to_string())
    }
}

/// Port for payment-gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent. Must complete within a bounded timeout;
    /// implementations fail with `GatewayError::Timeout` rather than hang.
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;
}
