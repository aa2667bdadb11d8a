//! HTTP handlers for the OTP endpoints.
//!
//! These endpoints are deliberately unauthenticated - they exist so users
//! who cannot log in (unverified email, forgotten password) can prove
//! control of their address.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::{domain_error_response, platform_header};
use crate::application::OtpService;

use super::dto::{MessageResponse, RequestCodeBody, ResendCodeBody, VerifyCodeBody, VerifyResponse};

/// Shared state for the OTP endpoints.
#[derive(Clone)]
pub struct OtpHandlers {
    service: Arc<OtpService>,
}

impl OtpHandlers {
    pub fn new(service: Arc<OtpService>) -> Self {
        Self { service }
    }
}

/// POST /api/otp/request-reset - Request a password reset code
///
/// Header `platform` selects the delivery flow: mobile gets a code, web
/// gets a reset link.
pub async fn request_reset(
    State(handlers): State<OtpHandlers>,
    headers: HeaderMap,
    Json(body): Json<RequestCodeBody>,
) -> Response {
    let platform = match platform_header(&headers, "platform") {
        Ok(platform) => platform,
        Err(response) => return response,
    };

    match handlers.service.request_password_reset(&body.email, platform).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "OTP sent successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/otp/request-verification - Request an email verification code
pub async fn request_verification(
    State(handlers): State<OtpHandlers>,
    headers: HeaderMap,
    Json(body): Json<RequestCodeBody>,
) -> Response {
    let platform = match platform_header(&headers, "platform") {
        Ok(platform) => platform,
        Err(response) => return response,
    };

    match handlers
        .service
        .request_email_verification(&body.email, platform)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "OTP sent successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/otp/verify - Verify a code
pub async fn verify(
    State(handlers): State<OtpHandlers>,
    Json(body): Json<VerifyCodeBody>,
) -> Response {
    match handlers
        .service
        .verify(&body.email, &body.code, body.purpose)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(VerifyResponse {
                message: "OTP verified successfully".to_string(),
                is_valid: true,
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/otp/resend - Re-issue and redeliver a code
pub async fn resend(
    State(handlers): State<OtpHandlers>,
    headers: HeaderMap,
    Json(body): Json<ResendCodeBody>,
) -> Response {
    let platform = match platform_header(&headers, "platform") {
        Ok(platform) => platform,
        Err(response) => return response,
    };

    match handlers
        .service
        .resend(&body.email, body.purpose, platform)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "OTP resent successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}
