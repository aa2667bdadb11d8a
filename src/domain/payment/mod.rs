//! Payment status lifecycle.
//!
//! A payment moves forward only:
//!
//! ```text
//! PENDING ──► PROCESSING ──► SUCCESS
//!    │             │
//!    │             └───────► FAILED
//!    ├───────────────────── ► SUCCESS   (offline methods, manual confirm)
//!    └───────────────────── ► FAILED
//! ```
//!
//! `SUCCESS` and `FAILED` are terminal. Card payments pass through
//! `PROCESSING` while the gateway holds the intent; bank transfer, mobile
//! money and cash stay `PENDING` until an administrator confirms them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, PaymentId, Platform, Timestamp, UserId,
};

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl PaymentStatus {
    /// Whether no further transitions are allowed out of this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// Transitions are forward-only; a terminal status permits nothing.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (*self, next),
            (Pending, Processing) | (Pending, Success) | (Pending, Failed)
                | (Processing, Success)
                | (Processing, Failed)
        )
    }

    /// Returns the wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PROCESSING" => Ok(PaymentStatus::Processing),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(UnknownPaymentValue(other.to_string())),
        }
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    MobileMoney,
    Cash,
}

impl PaymentMethod {
    /// Whether this method is mediated by the external payment gateway.
    ///
    /// Offline methods skip `PROCESSING` and await manual confirmation.
    pub fn uses_gateway(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }

    /// Returns the wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::MobileMoney => "MOBILE_MONEY",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(PaymentMethod::Card),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "MOBILE_MONEY" => Ok(PaymentMethod::MobileMoney),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(UnknownPaymentValue(other.to_string())),
        }
    }
}

/// Error for unrecognized status/method strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaymentValue(pub String);

impl fmt::Display for UnknownPaymentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment value '{}'", self.0)
    }
}

impl std::error::Error for UnknownPaymentValue {}

/// Free-form payment metadata plus the fields the core actually reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// Booking this payment settles, if any. Drives the confirmation cascade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,

    /// Platform the payment was submitted from.
    #[serde(default)]
    pub platform: Platform,

    /// Anything else the caller attached (provider, phone number, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of applying a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The status changed.
    Changed,
    /// The payment was already in the requested status; nothing changed.
    AlreadyInState,
}

/// A payment record.
///
/// Created `PENDING` at submission, mutated only through the transition
/// methods below, never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    id: PaymentId,
    user_id: UserId,
    amount: i64,
    currency: String,
    status: PaymentStatus,
    method: PaymentMethod,
    gateway_ref: Option<String>,
    description: Option<String>,
    metadata: PaymentMetadata,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Payment {
    /// Creates a new payment in `PENDING`.
    pub fn new(
        user_id: UserId,
        amount: i64,
        currency: impl Into<String>,
        method: PaymentMethod,
        description: Option<String>,
        metadata: PaymentMetadata,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            user_id,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Pending,
            method,
            gateway_ref: None,
            description,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a payment from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        user_id: UserId,
        amount: i64,
        currency: String,
        status: PaymentStatus,
        method: PaymentMethod,
        gateway_ref: Option<String>,
        description: Option<String>,
        metadata: PaymentMetadata,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            amount,
            currency,
            status,
            method,
            gateway_ref,
            description,
            metadata,
            created_at,
            updated_at,
        }
    }

    /// Applies a forward-only status transition.
    ///
    /// Re-applying the current status is an idempotent no-op
    /// (`Applied::AlreadyInState`), so a retried administrative update never
    /// errors; any other move a terminal or backward edge rejects.
    pub fn transition_to(&mut self, next: PaymentStatus) -> Result<Applied, DomainError> {
        if next == self.status {
            return Ok(Applied::AlreadyInState);
        }
        if !self.status.can_transition_to(next) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition payment from {} to {}", self.status, next),
            ));
        }
        self.status = next;
        self.updated_at = Timestamp::now();
        Ok(Applied::Changed)
    }

    /// Records the gateway reference and moves to `PROCESSING` in one step,
    /// so the reference is never observable without the matching status.
    pub fn begin_processing(&mut self, gateway_ref: impl Into<String>) -> Result<(), DomainError> {
        if self.status != PaymentStatus::Pending {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot begin processing a {} payment", self.status),
            ));
        }
        self.gateway_ref = Some(gateway_ref.into());
        self.status = PaymentStatus::Processing;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks the payment failed. Valid from any non-terminal status.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Failed).map(|_| ())
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn gateway_ref(&self) -> Option<&str> {
        self.gateway_ref.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn metadata(&self) -> &PaymentMetadata {
        &self.metadata
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
