//! One-time code HTTP endpoints.

mod dto;
mod handlers;
mod routes;

pub use handlers::OtpHandlers;
pub use routes::otp_routes;
