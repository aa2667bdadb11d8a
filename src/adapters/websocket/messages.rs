//! Wire messages for the real-time gateway.
//!
//! Client frames are JSON objects tagged by `action`; server frames are
//! tagged by `event` with the payload under `data`, matching the event names
//! the web and mobile clients subscribe to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{Platform, Timestamp, UserId};
use crate::ports::{BroadcastEvent, NotificationEnvelope};

/// Messages a client may send.
///
/// `Authenticate` must be the first frame on a fresh connection; everything
/// else is rejected until the handshake completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Handshake payload: bearer token plus declared platform.
    Authenticate {
        token: String,
        #[serde(default)]
        platform: Platform,
    },

    /// Join a named room.
    JoinRoom { room: String },

    /// Leave a named room.
    LeaveRoom { room: String },

    /// Relay a text message to everyone in a room.
    Message { room: String, message: String },
}

/// Acknowledgement emitted after a successful handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAck {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub platform: Platform,
    pub timestamp: Timestamp,
}

/// A relayed room message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMessage {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub room: String,
    pub message: String,
    pub platform: Platform,
    pub timestamp: Timestamp,
}

/// Payload attached to a fan-out broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastPayload {
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub timestamp: Timestamp,
}

/// Messages the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "connection_success")]
    ConnectionSuccess(ConnectionAck),

    #[serde(rename = "notification")]
    Notification(NotificationEnvelope),

    #[serde(rename = "message")]
    Message(RoomMessage),

    #[serde(rename = "newPlace")]
    NewPlace(BroadcastPayload),

    #[serde(rename = "activity")]
    Activity(BroadcastPayload),

    #[serde(rename = "payment")]
    Payment(BroadcastPayload),

    #[serde(rename = "placeUpdate")]
    PlaceUpdate(BroadcastPayload),

    #[serde(rename = "placeDelete")]
    PlaceDelete(BroadcastPayload),
}

impl ServerMessage {
    /// Wraps a domain broadcast into the matching event variant.
    pub fn broadcast(event: BroadcastEvent, payload: Value, platform: Option<Platform>) -> Self {
        let body = BroadcastPayload {
            payload,
            platform,
            timestamp: Timestamp::now(),
        };
        match event {
            BroadcastEvent::NewPlace => ServerMessage::NewPlace(body),
            BroadcastEvent::Activity => ServerMessage::Activity(body),
            BroadcastEvent::Payment => ServerMessage::Payment(body),
            BroadcastEvent::PlaceUpdate => ServerMessage::PlaceUpdate(body),
            BroadcastEvent::PlaceDelete => ServerMessage::PlaceDelete(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_frame_parses_with_default_platform() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"authenticate","token":"abc"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Authenticate {
                token: "abc".to_string(),
                platform: Platform::Web,
            }
        );
    }

    #[test]
    fn room_frames_parse() {
        let join: ClientMessage =
            serde_json::from_str(r#"{"action":"joinRoom","room":"lobby"}"#).unwrap();
        assert_eq!(join, ClientMessage::JoinRoom { room: "lobby".into() });

        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"message","room":"lobby","message":"hi"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Message {
                room: "lobby".into(),
                message: "hi".into()
            }
        );
    }

    #[test]
    fn connection_success_uses_wire_names() {
        let ack = ServerMessage::ConnectionSuccess(ConnectionAck {
            user_id: UserId::new("user-1").unwrap(),
            platform: Platform::Mobile,
            timestamp: Timestamp::now(),
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["event"], "connection_success");
        assert_eq!(json["data"]["userId"], "user-1");
        assert_eq!(json["data"]["platform"], "mobile");
    }

    #[test]
    fn broadcast_maps_every_event_name() {
        for (event, name) in [
            (BroadcastEvent::NewPlace, "newPlace"),
            (BroadcastEvent::Activity, "activity"),
            (BroadcastEvent::Payment, "payment"),
            (BroadcastEvent::PlaceUpdate, "placeUpdate"),
            (BroadcastEvent::PlaceDelete, "placeDelete"),
        ] {
            let msg = ServerMessage::broadcast(event, serde_json::json!({"id": 1}), None);
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["event"], name);
            assert_eq!(json["data"]["payload"]["id"], 1);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"shutdown"}"#).is_err());
    }
}
