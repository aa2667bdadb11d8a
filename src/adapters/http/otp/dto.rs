//! HTTP DTOs for the OTP endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::otp::OtpPurpose;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body for code-issuance requests (`request-reset`, `request-verification`).
#[derive(Debug, Clone, Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

/// Body for `POST /otp/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
    #[serde(rename = "type")]
    pub purpose: OtpPurpose,
}

/// Body for `POST /otp/resend`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResendCodeBody {
    pub email: String,
    #[serde(rename = "type")]
    pub purpose: OtpPurpose,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Verification acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub message: String,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}
