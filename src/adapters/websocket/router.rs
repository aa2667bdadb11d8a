//! Notification routing over live connections.
//!
//! The router is the only writer to connected sockets. Every delivery is
//! best-effort: a user with no live connection is a silent no-op, a platform
//! filter that matches nothing is a silent no-op, and a closed transport
//! channel is logged and swallowed. Nothing here ever returns an error to
//! the business operation that triggered the push.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{Platform, Timestamp, UserId};
use crate::ports::{BroadcastEvent, Notification, NotificationEnvelope, Notifier};

use super::messages::{RoomMessage, ServerMessage};
use super::registry::{ConnectionRegistry, ConnectionSnapshot};
use super::rooms::RoomManager;

/// Routes notifications and broadcasts to live connections.
pub struct NotificationRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomManager>,
}

impl NotificationRouter {
    /// Creates a router over the given registry and room manager.
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomManager>) -> Self {
        Self { registry, rooms }
    }

    /// Delivers a notification to the user's matching live connection(s).
    ///
    /// With no platform filter, every slot the user holds (web and mobile)
    /// receives its own envelope stamped with that connection's platform.
    pub async fn send(&self, user_id: &UserId, notification: Notification) {
        let connections = self.registry.connections_for(user_id).await;
        if connections.is_empty() {
            tracing::trace!(user_id = %user_id, "No live connection; notification dropped");
            return;
        }

        for connection in connections {
            if let Some(filter) = notification.platform_filter {
                if filter != connection.platform {
                    continue;
                }
            }

            let envelope = NotificationEnvelope {
                title: notification.title.clone(),
                message: notification.message.clone(),
                kind: notification.kind.clone(),
                data: notification.data.clone(),
                platform: connection.platform,
                timestamp: Timestamp::now(),
            };
            self.deliver(&connection, ServerMessage::Notification(envelope));
        }
    }

    /// Fans an event out to every live connection, unconditionally.
    ///
    /// The platform argument rides along in the payload (clients use it to
    /// pick a rendering); it does not restrict who receives the event.
    pub async fn broadcast_to_all(
        &self,
        event: BroadcastEvent,
        payload: Value,
        platform: Option<Platform>,
    ) {
        for connection in self.registry.all_connections().await {
            self.deliver(
                &connection,
                ServerMessage::broadcast(event, payload.clone(), platform),
            );
        }
    }

    /// Fans an event out to a room's members, optionally restricted to
    /// connections from one platform.
    pub async fn broadcast_to_room(
        &self,
        room: &str,
        event: BroadcastEvent,
        payload: Value,
        platform: Option<Platform>,
    ) {
        for member in self.rooms.members(room).await {
            let Some(connection) = self.registry.connection(member).await else {
                continue;
            };
            if let Some(filter) = platform {
                if filter != connection.platform {
                    continue;
                }
            }
            self.deliver(
                &connection,
                ServerMessage::broadcast(event, payload.clone(), Some(connection.platform)),
            );
        }
    }

    /// Relays a client text message to everyone in a room, sender included.
    pub async fn relay_room_message(
        &self,
        room: &str,
        from: &UserId,
        from_platform: Platform,
        text: &str,
    ) {
        let message = RoomMessage {
            user_id: from.clone(),
            room: room.to_string(),
            message: text.to_string(),
            platform: from_platform,
            timestamp: Timestamp::now(),
        };
        for member in self.rooms.members(room).await {
            let Some(connection) = self.registry.connection(member).await else {
                continue;
            };
            self.deliver(&connection, ServerMessage::Message(message.clone()));
        }
    }

    fn deliver(&self, connection: &ConnectionSnapshot, message: ServerMessage) {
        if !connection.send(message) {
            // The receiving task went away between lookup and send; the
            // disconnect path will clean the slot up.
            tracing::debug!(
                connection_id = %connection.id,
                user_id = %connection.user_id,
                "Transport channel closed; message dropped"
            );
        }
    }
}

#[async_trait]
impl Notifier for NotificationRouter {
    async fn notify(&self, user_id: &UserId, notification: Notification) {
        self.send(user_id, notification).await;
    }

    async fn broadcast(&self, event: BroadcastEvent, payload: Value, platform: Option<Platform>) {
        self.broadcast_to_all(event, payload, platform).await;
    }
}
