//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `auth` - JWT token verification (plus mock)
//! - `email` - Resend mail delivery (plus mock)
//! - `http` - REST endpoints and middleware
//! - `memory` - In-memory stores for tests and local development
//! - `postgres` - sqlx store implementations
//! - `stripe` - Payment gateway (plus mock)
//! - `websocket` - Real-time notification gateway

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
pub mod websocket;
