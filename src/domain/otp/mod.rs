//! One-time verification code lifecycle.
//!
//! A code is scoped by (email, purpose) and moves through
//! none-active → active → {consumed, expired, superseded}. At most one
//! unexpired, unused code exists per scope at any instant; issuance
//! supersedes whatever was active before it.

mod code;

pub use code::{InvalidOtpCode, OtpCode};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{OtpId, Platform, Timestamp, UserId};

/// Expiry window for the standard request/resend flows.
pub const STANDARD_TTL_MINUTES: i64 = 15;

/// Expiry window for codes issued during account registration.
pub const REGISTRATION_TTL_MINUTES: i64 = 10;

/// What a one-time code proves control of an email address *for*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    EmailVerification,
    PasswordReset,
}

impl OtpPurpose {
    /// Returns the wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::EmailVerification => "EMAIL_VERIFICATION",
            OtpPurpose::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_VERIFICATION" => Ok(OtpPurpose::EmailVerification),
            "PASSWORD_RESET" => Ok(OtpPurpose::PasswordReset),
            other => Err(UnknownPurpose(other.to_string())),
        }
    }
}

/// Error for unrecognized purpose strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPurpose(pub String);

impl fmt::Display for UnknownPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown OTP purpose '{}'", self.0)
    }
}

impl std::error::Error for UnknownPurpose {}

/// A persisted one-time verification code.
///
/// Rows are never deleted: consumed and superseded codes stay behind with
/// `is_used = true`, and expiry is evaluated lazily at verification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    id: OtpId,
    email: String,
    code: OtpCode,
    purpose: OtpPurpose,
    expires_at: Timestamp,
    is_used: bool,
    user_id: UserId,
    platform: Platform,
    created_at: Timestamp,
}

impl OneTimeCode {
    /// Issues a fresh code for (email, purpose) with the given expiry window.
    ///
    /// The code itself comes from the OS CSPRNG; see [`OtpCode::generate`].
    pub fn issue(
        email: impl Into<String>,
        purpose: OtpPurpose,
        user_id: UserId,
        platform: Platform,
        ttl_minutes: i64,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: OtpId::new(),
            email: email.into(),
            code: OtpCode::generate(),
            purpose,
            expires_at: now.plus_minutes(ttl_minutes),
            is_used: false,
            user_id,
            platform,
            created_at: now,
        }
    }

    /// Rehydrates a code from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OtpId,
        email: String,
        code: OtpCode,
        purpose: OtpPurpose,
        expires_at: Timestamp,
        is_used: bool,
        user_id: UserId,
        platform: Platform,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            code,
            purpose,
            expires_at,
            is_used,
            user_id,
            platform,
            created_at,
        }
    }

    /// Whether the expiry instant has passed.
    pub fn is_expired(&self, now: &Timestamp) -> bool {
        !self.expires_at.is_after(now)
    }

    /// Whether the code would verify right now: unused and unexpired.
    pub fn is_active(&self, now: &Timestamp) -> bool {
        !self.is_used && !self.is_expired(now)
    }

    /// Marks the code consumed (or superseded). Idempotent.
    pub fn mark_used(&mut self) {
        self.is_used = true;
    }

    pub fn id(&self) -> OtpId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn code(&self) -> &OtpCode {
        &self.code
    }

    pub fn purpose(&self) -> OtpPurpose {
        self.purpose
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.is_used
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
