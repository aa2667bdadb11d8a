//! Stayline - Booking platform backend.
//!
//! This crate implements the platform's engineering core: a real-time
//! multi-platform notification gateway, the one-time verification code
//! lifecycle, and the payment status lifecycle, behind a REST and
//! WebSocket surface.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
