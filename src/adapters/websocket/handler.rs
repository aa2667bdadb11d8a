//! WebSocket upgrade handler and connection lifecycle.
//!
//! Connection lifecycle:
//! 1. HTTP → WebSocket upgrade on `GET /ws`
//! 2. Handshake: the first frame must be an `authenticate` message carrying
//!    a bearer token and the declared platform, within the handshake timeout
//! 3. On success: register with the connection registry, emit
//!    `connection_success`, then pump messages until disconnect
//! 4. On failure: close immediately - no acknowledgement, no registry entry
//! 5. Cleanup: leave all rooms, unregister
//!
//! The handshake gate runs before any other frame from the connection is
//! processed.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::domain::foundation::{AuthError, AuthenticatedUser, ConnectionId, Platform, Timestamp};
use crate::ports::TokenVerifier;

use super::messages::{ClientMessage, ConnectionAck, ServerMessage};
use super::registry::ConnectionRegistry;
use super::rooms::RoomManager;
use super::router::NotificationRouter;

/// Default time a fresh connection gets to complete the handshake.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for the real-time gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<ConnectionRegistry>,
    pub rooms: Arc<RoomManager>,
    pub router: Arc<NotificationRouter>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub handshake_timeout: Duration,
}

impl GatewayState {
    /// Wires a gateway state over shared registry/rooms/router.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomManager>,
        router: Arc<NotificationRouter>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            registry,
            rooms,
            router,
            verifier,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Overrides the handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

/// An authenticated, registered session.
#[derive(Debug)]
pub(crate) struct Session {
    pub user: AuthenticatedUser,
    pub platform: Platform,
    pub connection_id: ConnectionId,
    /// Read half of the outbound channel; the registry holds the write half.
    pub outbox: UnboundedReceiver<ServerMessage>,
}

/// Validates the handshake frame and registers the connection.
///
/// On success the `connection_success` acknowledgement is already queued as
/// the first message in the session's outbox. On failure nothing was
/// registered and nothing will be sent.
pub(crate) async fn open_session(
    state: &GatewayState,
    first_frame: &str,
) -> Result<Session, AuthError> {
    let (token, platform) = match serde_json::from_str::<ClientMessage>(first_frame) {
        Ok(ClientMessage::Authenticate { token, platform }) => (token, platform),
        _ => return Err(AuthError::HandshakeIncomplete),
    };

    let user = state.verifier.verify(&token).await?;

    let (tx, outbox) = mpsc::unbounded_channel();
    let connection_id = state
        .registry
        .register(user.id.clone(), platform, tx.clone())
        .await;

    let ack = ServerMessage::ConnectionSuccess(ConnectionAck {
        user_id: user.id.clone(),
        platform,
        timestamp: Timestamp::now(),
    });
    // The channel was created two lines up; this cannot fail yet.
    let _ = tx.send(ack);

    tracing::info!(user_id = %user.id, platform = %platform, "Client connected");

    Ok(Session {
        user,
        platform,
        connection_id,
        outbox,
    })
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs for the lifetime of one connection.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut sink, mut stream) = socket.split();

    // Handshake gate: first frame, bounded by the handshake timeout.
    let first_frame = match tokio::time::timeout(state.handshake_timeout, stream.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(_) => {
            tracing::debug!("Connection closed before handshake");
            let _ = sink.close().await;
            return;
        }
        Err(_) => {
            tracing::debug!("Handshake timed out");
            let _ = sink.close().await;
            return;
        }
    };

    let session = match open_session(&state, &first_frame).await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected realtime handshake");
            let _ = sink.close().await;
            return;
        }
    };

    let Session {
        user,
        platform,
        connection_id,
        mut outbox,
    } = session;

    // Outbound pump: registry/router enqueue, this task writes to the wire.
    // Ends when the registry drops the sender (slot replaced) or the wire
    // write fails.
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                    continue;
                }
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Inbound pump: room management and message relay.
    let recv_state = state.clone();
    let recv_user = user.id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::JoinRoom { room }) => {
                        recv_state.rooms.join(&room, connection_id).await;
                        tracing::debug!(user_id = %recv_user, room = %room, "Joined room");
                    }
                    Ok(ClientMessage::LeaveRoom { room }) => {
                        recv_state.rooms.leave(&room, connection_id).await;
                        tracing::debug!(user_id = %recv_user, room = %room, "Left room");
                    }
                    Ok(ClientMessage::Message { room, message }) => {
                        recv_state
                            .router
                            .relay_room_message(&room, &recv_user, platform, &message)
                            .await;
                    }
                    Ok(ClientMessage::Authenticate { .. }) => {
                        tracing::trace!(user_id = %recv_user, "Ignoring repeated authenticate frame");
                    }
                    Err(_) => {
                        tracing::trace!(user_id = %recv_user, "Ignoring malformed frame");
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {
                    // Binary unsupported; protocol ping/pong handled by axum.
                }
                Err(e) => {
                    tracing::debug!(user_id = %recv_user, error = %e, "Receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.rooms.leave_all(connection_id).await;
    state.registry.unregister(connection_id).await;
    tracing::info!(user_id = %user.id, platform = %platform, "Client disconnected");
}

/// Creates the axum router for the real-time gateway.
pub fn gateway_routes(state: GatewayState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}
