//! Real-time notification gateway over WebSocket.
//!
//! - `registry` - in-memory table of live connections (one slot per
//!   (user, platform))
//! - `rooms` - room membership for grouped broadcasts
//! - `router` - best-effort delivery to users, rooms and everyone
//! - `handler` - upgrade endpoint, auth handshake, connection lifecycle
//! - `messages` - wire format

pub mod handler;
pub mod messages;
pub mod registry;
pub mod rooms;
pub mod router;

pub use handler::{gateway_routes, ws_handler, GatewayState};
pub use messages::{ClientMessage, ConnectionAck, RoomMessage, ServerMessage};
pub use registry::{ConnectionRegistry, ConnectionSender, ConnectionSnapshot};
pub use rooms::RoomManager;
pub use router::NotificationRouter;
