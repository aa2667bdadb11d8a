//! HTTP handlers for the payment endpoints.
//!
//! All endpoints require authentication. Listing every payment and updating
//! a payment's status are administrative: the handler performs the
//! capability check against the token's role claim before invoking the
//! core, which itself knows nothing about roles.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::{domain_error_response, platform_header, ErrorResponse};
use crate::application::{PaymentService, ProcessPaymentRequest};
use crate::domain::foundation::{AuthenticatedUser, PaymentId};

use super::dto::{PaymentResponse, RecordPaymentRequest, UpdateStatusRequest};

/// Shared state for the payment endpoints.
#[derive(Clone)]
pub struct PaymentHandlers {
    service: Arc<PaymentService>,
}

impl PaymentHandlers {
    pub fn new(service: Arc<PaymentService>) -> Self {
        Self { service }
    }
}

fn require_admin(user: &AuthenticatedUser) -> Result<(), Response> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("FORBIDDEN", "Administrator role required")),
        )
            .into_response())
    }
}

fn parse_payment_id(raw: &str) -> Result<PaymentId, Response> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid payment ID")),
        )
            .into_response()
    })
}

/// POST /api/payments - Submit a payment
pub async fn process_payment(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(body): Json<RecordPaymentRequest>,
) -> Response {
    let platform = match platform_header(&headers, "x-platform") {
        Ok(platform) => platform,
        Err(response) => return response,
    };

    if body.amount <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Amount must be positive")),
        )
            .into_response();
    }

    let request = ProcessPaymentRequest {
        user_id: user.id,
        amount: body.amount,
        currency: body.currency,
        method: body.method,
        booking_id: body.booking_id,
        description: body.description,
        extra: body.metadata,
    };

    match handlers.service.process(request, platform).await {
        Ok(instructions) => (StatusCode::CREATED, Json(instructions)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// GET /api/payments - List payments (admin only)
pub async fn list_payments(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_admin(&user) {
        return response;
    }

    // Optional platform filter; absence means every platform.
    let platform = match headers.get("x-platform") {
        None => None,
        Some(_) => match platform_header(&headers, "x-platform") {
            Ok(platform) => Some(platform),
            Err(response) => return response,
        },
    };

    match handlers.service.list(platform).await {
        Ok(payments) => {
            let body: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// GET /api/payments/:id - Fetch one payment
pub async fn get_payment(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_payment_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.get(&id).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// PUT /api/payments/:id/status - Update payment status (admin only)
pub async fn update_payment_status(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Response {
    if let Err(response) = require_admin(&user) {
        return response;
    }

    let id = match parse_payment_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.update_status(&id, body.status).await {
        Ok(payment) => (StatusCode::OK, Json(PaymentResponse::from(payment))).into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// GET /api/payments/:id/receipt - Generate a receipt
pub async fn payment_receipt(
    State(handlers): State<PaymentHandlers>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_payment_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.receipt(&id).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(e) => domain_error_response(e),
    }
}
