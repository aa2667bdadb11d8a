//! HTTP DTOs for the payment endpoints.
//!
//! These types decouple the HTTP API from domain types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookingId, Platform, UserId};
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body for `POST /payments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount: i64,
    pub currency: String,
    pub method: PaymentMethod,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form extras (mobile money provider, phone number, ...).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Body for `PUT /payments/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PaymentStatus,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A payment record as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub user_id: UserId,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id().to_string(),
            user_id: payment.user_id().clone(),
            amount: payment.amount(),
            currency: payment.currency().to_string(),
            status: payment.status(),
            method: payment.method(),
            gateway_ref: payment.gateway_ref().map(String::from),
            description: payment.description().map(String::from),
            platform: payment.metadata().platform,
            booking_id: payment.metadata().booking_id,
            created_at: payment.created_at().to_rfc3339(),
            updated_at: payment.updated_at().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMetadata;

    #[test]
    fn record_payment_request_parses() {
        let body: RecordPaymentRequest = serde_json::from_str(
            r#"{"amount":5000,"currency":"usd","method":"CARD","metadata":{"note":"x"}}"#,
        )
        .unwrap();
        assert_eq!(body.amount, 5000);
        assert_eq!(body.method, PaymentMethod::Card);
        assert!(body.booking_id.is_none());
        assert_eq!(body.metadata.get("note").unwrap(), "x");
    }

    #[test]
    fn payment_response_carries_platform_and_booking() {
        let booking_id = BookingId::new();
        let payment = Payment::new(
            UserId::new("user-1").unwrap(),
            5000,
            "usd",
            PaymentMethod::Card,
            None,
            PaymentMetadata {
                booking_id: Some(booking_id),
                platform: Platform::Mobile,
                extra: serde_json::Map::new(),
            },
        );

        let response: PaymentResponse = payment.into();
        assert_eq!(response.platform, Platform::Mobile);
        assert_eq!(response.booking_id, Some(booking_id));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["method"], "CARD");
    }
}
