//! Notifier port - Best-effort real-time notification delivery.
//!
//! A notification is a hint, not a guarantee: delivery to a user with no
//! live connection is a silent no-op, and transport failures are logged and
//! swallowed by the implementation. The methods are deliberately infallible
//! so no business operation can fail because a push did.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{Platform, Timestamp, UserId};

/// A notification addressed to a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Short headline shown by the client.
    pub title: String,

    /// Human-readable body.
    pub message: String,

    /// Machine-readable kind (e.g. "EMAIL_VERIFICATION", "PAYMENT_SUCCESS").
    pub kind: Option<String>,

    /// Only deliver to a connection from this platform, when set.
    pub platform_filter: Option<Platform>,

    /// Structured payload for the client to act on.
    pub data: Option<Value>,
}

impl Notification {
    /// Creates a notification with just a title and message.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: None,
            platform_filter: None,
            data: None,
        }
    }

    /// Sets the machine-readable kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Restricts delivery to one platform.
    pub fn for_platform(mut self, platform: Platform) -> Self {
        self.platform_filter = Some(platform);
        self
    }

    /// Attaches a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Envelope delivered over the live transport.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NotificationEnvelope {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Platform of the connection that actually received the envelope.
    pub platform: Platform,
    pub timestamp: Timestamp,
}

/// Domain events fanned out to every connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastEvent {
    NewPlace,
    Activity,
    Payment,
    PlaceUpdate,
    PlaceDelete,
}

impl BroadcastEvent {
    /// Returns the wire event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastEvent::NewPlace => "newPlace",
            BroadcastEvent::Activity => "activity",
            BroadcastEvent::Payment => "payment",
            BroadcastEvent::PlaceUpdate => "placeUpdate",
            BroadcastEvent::PlaceDelete => "placeDelete",
        }
    }
}

impl std::fmt::Display for BroadcastEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port for pushing real-time events to connected clients.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a notification to the user's matching live connection(s).
    /// No-ops silently when none are connected or the platform filter
    /// excludes them all.
    async fn notify(&self, user_id: &UserId, notification: Notification);

    /// Fans an event out to every live connection, optionally restricted to
    /// one platform.
    async fn broadcast(&self, event: BroadcastEvent, payload: Value, platform: Option<Platform>);
}
