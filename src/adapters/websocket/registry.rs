//! In-memory registry of live WebSocket connections.
//!
//! The registry owns every `Connection` exclusively: entries are created by
//! a successful handshake and destroyed on disconnect or when a newer
//! handshake replaces them. One slot is kept per (user, platform) pair, so a
//! web session and a mobile session coexist while a second handshake from
//! the *same* platform evicts its predecessor.
//!
//! # Thread Safety
//!
//! A single `RwLock` guards both indexes (connection table and per-user
//! slots), so readers see a consistent view and concurrent
//! connect/disconnect/send races on the same user resolve cleanly. Sends
//! themselves happen outside the lock over the snapshot's channel sender.
//!
//! No persistence; the registry is empty on process restart.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConnectionId, Platform, UserId};

use super::messages::ServerMessage;

/// Transport handle: the write half of a connection's outbound channel.
pub type ConnectionSender = UnboundedSender<ServerMessage>;

/// A live connection as stored in the registry.
#[derive(Debug, Clone)]
struct Connection {
    user_id: UserId,
    platform: Platform,
    sender: ConnectionSender,
}

/// Read-only view of a connection handed out to senders.
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub platform: Platform,
    sender: ConnectionSender,
}

impl ConnectionSnapshot {
    /// Attempts to enqueue a message on the connection's outbound channel.
    ///
    /// Returns `false` when the receiving task has already gone away. The
    /// channel is unbounded, so this never blocks on backpressure.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

#[derive(Default)]
struct RegistryState {
    /// connection_id → connection.
    connections: HashMap<ConnectionId, Connection>,

    /// user_id → platform → connection_id, for per-user lookup and the
    /// one-slot-per-(user, platform) replacement policy.
    by_user: HashMap<UserId, HashMap<Platform, ConnectionId>>,
}

/// In-memory table of currently-live real-time sessions.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, replacing any existing entry for the same
    /// (user, platform) slot, and returns the new connection's id.
    ///
    /// The replaced entry's sender is dropped, which closes the old
    /// connection's outbound channel and lets its socket task shut down.
    pub async fn register(
        &self,
        user_id: UserId,
        platform: Platform,
        sender: ConnectionSender,
    ) -> ConnectionId {
        let id = ConnectionId::new();
        let mut state = self.state.write().await;

        let slots = state.by_user.entry(user_id.clone()).or_default();
        let replaced = slots.insert(platform, id);

        state.connections.insert(
            id,
            Connection {
                user_id: user_id.clone(),
                platform,
                sender,
            },
        );

        if let Some(old_id) = replaced {
            state.connections.remove(&old_id);
            tracing::debug!(
                user_id = %user_id,
                platform = %platform,
                replaced = %old_id,
                "Replaced existing connection slot"
            );
        }

        id
    }

    /// Removes a connection if it is still the live one for its slot.
    ///
    /// A stale disconnect (the slot has since been taken over by a newer
    /// handshake) is a no-op and must not evict the newer connection.
    pub async fn unregister(&self, id: ConnectionId) {
        let mut state = self.state.write().await;

        let Some(connection) = state.connections.remove(&id) else {
            return;
        };

        if let Some(slots) = state.by_user.get_mut(&connection.user_id) {
            // Only clear the slot when it still points at this connection.
            if slots.get(&connection.platform) == Some(&id) {
                slots.remove(&connection.platform);
            }
            if slots.is_empty() {
                state.by_user.remove(&connection.user_id);
            }
        }
    }

    /// Returns snapshots of the user's live connections (zero, one, or two).
    pub async fn connections_for(&self, user_id: &UserId) -> Vec<ConnectionSnapshot> {
        let state = self.state.read().await;
        let Some(slots) = state.by_user.get(user_id) else {
            return Vec::new();
        };
        slots
            .values()
            .filter_map(|id| state.connections.get(id).map(|c| snapshot(*id, c)))
            .collect()
    }

    /// Returns a snapshot of a single connection, if still live.
    pub async fn connection(&self, id: ConnectionId) -> Option<ConnectionSnapshot> {
        let state = self.state.read().await;
        state.connections.get(&id).map(|c| snapshot(id, c))
    }

    /// Returns snapshots of every live connection.
    pub async fn all_connections(&self) -> Vec<ConnectionSnapshot> {
        let state = self.state.read().await;
        state
            .connections
            .iter()
            .map(|(id, c)| snapshot(*id, c))
            .collect()
    }

    /// Whether the user has any live connection.
    pub async fn is_connected(&self, user_id: &UserId) -> bool {
        self.state.read().await.by_user.contains_key(user_id)
    }

    /// Total live connections.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    /// Users with at least one live connection.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.by_user.len()
    }
}

fn snapshot(id: ConnectionId, connection: &Connection) -> ConnectionSnapshot {
    ConnectionSnapshot {
        id,
        user_id: connection.user_id.clone(),
        platform: connection.platform,
        sender: connection.sender.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn channel() -> (ConnectionSender, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn register_then_lookup_returns_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();

        registry.register(user("u1"), Platform::Web, tx).await;

        let connections = registry.connections_for(&user("u1")).await;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].platform, Platform::Web);
        assert!(registry.is_connected(&user("u1")).await);
    }

    #[tokio::test]
    async fn web_and_mobile_slots_coexist() {
        let registry = ConnectionRegistry::new();
        let (web_tx, _web_rx) = channel();
        let (mob_tx, _mob_rx) = channel();

        registry.register(user("u1"), Platform::Web, web_tx).await;
        registry.register(user("u1"), Platform::Mobile, mob_tx).await;

        let connections = registry.connections_for(&user("u1")).await;
        assert_eq!(connections.len(), 2);
        assert_eq!(registry.user_count().await, 1);
        assert_eq!(registry.connection_count().await, 2);
    }

    #[tokio::test]
    async fn same_platform_handshake_replaces_previous_slot() {
        let registry = ConnectionRegistry::new();
        let (old_tx, mut old_rx) = channel();
        let (new_tx, _new_rx) = channel();

        let old_id = registry.register(user("u1"), Platform::Mobile, old_tx).await;
        let new_id = registry.register(user("u1"), Platform::Mobile, new_tx).await;
        assert_ne!(old_id, new_id);

        // Old connection is gone and its channel closed.
        assert!(registry.connection(old_id).await.is_none());
        assert!(old_rx.recv().await.is_none());

        let connections = registry.connections_for(&user("u1")).await;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].id, new_id);
    }

    #[tokio::test]
    async fn unregister_removes_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();

        let id = registry.register(user("u1"), Platform::Web, tx).await;
        registry.unregister(id).await;

        assert!(!registry.is_connected(&user("u1")).await);
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn stale_unregister_does_not_evict_newer_connection() {
        let registry = ConnectionRegistry::new();
        let (old_tx, _old_rx) = channel();
        let (new_tx, _new_rx) = channel();

        let old_id = registry.register(user("u1"), Platform::Web, old_tx).await;
        let new_id = registry.register(user("u1"), Platform::Web, new_tx).await;

        // The old socket's cleanup fires after the replacement handshake.
        registry.unregister(old_id).await;

        let connections = registry.connections_for(&user("u1")).await;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].id, new_id);
    }

    #[tokio::test]
    async fn unregister_unknown_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.unregister(ConnectionId::new()).await;
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn lookup_for_unknown_user_is_empty() {
        let registry = ConnectionRegistry::new();
        assert!(registry.connections_for(&user("ghost")).await.is_empty());
        assert!(!registry.is_connected(&user("ghost")).await);
    }

    #[tokio::test]
    async fn snapshot_send_reaches_receiver() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        registry.register(user("u1"), Platform::Web, tx).await;

        let connections = registry.connections_for(&user("u1")).await;
        assert!(connections[0].send(ServerMessage::broadcast(
            crate::ports::BroadcastEvent::Activity,
            serde_json::json!({"k": "v"}),
            None,
        )));
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn concurrent_registrations_keep_indexes_consistent() {
        use std::sync::Arc;

        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let platform = if i % 2 == 0 { Platform::Web } else { Platform::Mobile };
                registry.register(user("contended"), platform, tx).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // However the races resolved, exactly one connection survives per
        // platform slot and the table agrees with the index.
        let connections = registry.connections_for(&user("contended")).await;
        assert_eq!(connections.len(), 2);
        assert_eq!(registry.connection_count().await, 2);
    }
}
