//! HTTP routes for the OTP endpoints.

use axum::{routing::post, Router};

use super::handlers::{request_reset, request_verification, resend, verify, OtpHandlers};

/// Creates the OTP router.
pub fn otp_routes(handlers: OtpHandlers) -> Router {
    Router::new()
        .route("/request-reset", post(request_reset))
        .route("/request-verification", post(request_verification))
        .route("/verify", post(verify))
        .route("/resend", post(resend))
        .with_state(handlers)
}
