//! HTTP adapters - REST surface over the core.
//!
//! - `middleware` - Bearer-token authentication layer and extractors
//! - `otp` - One-time code endpoints
//! - `payment` - Payment endpoints
//!
//! Error responses carry a generic safe message plus a machine code;
//! internal detail goes to tracing only.

pub mod middleware;
pub mod otp;
pub mod payment;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode, Platform};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_FAILED", message)
    }
}

/// Maps a domain error onto an HTTP response.
///
/// Infrastructure failures collapse to a generic 500; their detail is
/// logged, never returned.
pub fn domain_error_response(err: DomainError) -> Response {
    let status = match err.code() {
        ErrorCode::ValidationFailed
        | ErrorCode::InvalidOrExpiredCode
        | ErrorCode::EmailAlreadyVerified
        | ErrorCode::InvalidStateTransition
        | ErrorCode::GatewayError => StatusCode::BAD_REQUEST,
        ErrorCode::UserNotFound | ErrorCode::PaymentNotFound | ErrorCode::BookingNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::EmailDeliveryError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(code = %err.code(), detail = %err.message(), "Internal error");
        ErrorResponse::new(err.code().to_string(), "Internal server error")
    } else {
        ErrorResponse::new(err.code().to_string(), err.message())
    };

    (status, Json(body)).into_response()
}

/// Reads a platform header, defaulting to `web` when absent.
///
/// An unrecognized value is a 400, not a silent default.
pub(crate) fn platform_header(headers: &HeaderMap, name: &str) -> Result<Platform, Response> {
    match headers.get(name) {
        None => Ok(Platform::Web),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request(format!(
                        "Header '{}' must be 'web' or 'mobile'",
                        name
                    ))),
                )
                    .into_response()
            }),
    }
}
