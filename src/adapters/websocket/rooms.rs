//! Room membership for grouped broadcasts.
//!
//! Rooms are plain string names; membership is tracked by connection id with
//! a reverse index so disconnect cleanup is O(rooms joined), not O(rooms).

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::domain::foundation::ConnectionId;

#[derive(Default)]
struct RoomState {
    /// room → member connection ids.
    rooms: HashMap<String, HashSet<ConnectionId>>,

    /// connection id → rooms joined, for cleanup on disconnect.
    memberships: HashMap<ConnectionId, HashSet<String>>,
}

/// Tracks which connections are in which rooms.
#[derive(Default)]
pub struct RoomManager {
    state: RwLock<RoomState>,
}

impl RoomManager {
    /// Creates an empty room manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Joining twice is a no-op.
    pub async fn join(&self, room: &str, connection: ConnectionId) {
        let mut state = self.state.write().await;
        state.rooms.entry(room.to_string()).or_default().insert(connection);
        state
            .memberships
            .entry(connection)
            .or_default()
            .insert(room.to_string());
    }

    /// Removes a connection from a room; empty rooms are dropped.
    pub async fn leave(&self, room: &str, connection: ConnectionId) {
        let mut state = self.state.write().await;
        if let Some(members) = state.rooms.get_mut(room) {
            members.remove(&connection);
            if members.is_empty() {
                state.rooms.remove(room);
            }
        }
        if let Some(joined) = state.memberships.get_mut(&connection) {
            joined.remove(room);
            if joined.is_empty() {
                state.memberships.remove(&connection);
            }
        }
    }

    /// Removes a connection from every room it joined (disconnect path).
    pub async fn leave_all(&self, connection: ConnectionId) {
        let mut state = self.state.write().await;
        let Some(joined) = state.memberships.remove(&connection) else {
            return;
        };
        for room in joined {
            if let Some(members) = state.rooms.get_mut(&room) {
                members.remove(&connection);
                if members.is_empty() {
                    state.rooms.remove(&room);
                }
            }
        }
    }

    /// Returns the member connection ids of a room (empty if unknown).
    pub async fn members(&self, room: &str) -> Vec<ConnectionId> {
        let state = self.state.read().await;
        state
            .rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of active rooms.
    pub async fn room_count(&self) -> usize {
        self.state.read().await.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_and_members() {
        let rooms = RoomManager::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        rooms.join("lobby", a).await;
        rooms.join("lobby", b).await;

        let members = rooms.members("lobby").await;
        assert_eq!(members.len(), 2);
        assert!(members.contains(&a));
        assert!(members.contains(&b));
    }

    #[tokio::test]
    async fn leave_removes_member_and_empty_room() {
        let rooms = RoomManager::new();
        let a = ConnectionId::new();

        rooms.join("lobby", a).await;
        rooms.leave("lobby", a).await;

        assert!(rooms.members("lobby").await.is_empty());
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn leave_all_clears_every_membership() {
        let rooms = RoomManager::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        rooms.join("lobby", a).await;
        rooms.join("deals", a).await;
        rooms.join("deals", b).await;

        rooms.leave_all(a).await;

        assert!(rooms.members("lobby").await.is_empty());
        assert_eq!(rooms.members("deals").await, vec![b]);
    }

    #[tokio::test]
    async fn double_join_is_idempotent() {
        let rooms = RoomManager::new();
        let a = ConnectionId::new();

        rooms.join("lobby", a).await;
        rooms.join("lobby", a).await;

        assert_eq!(rooms.members("lobby").await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_room_has_no_members() {
        let rooms = RoomManager::new();
        assert!(rooms.members("nowhere").await.is_empty());
    }
}
