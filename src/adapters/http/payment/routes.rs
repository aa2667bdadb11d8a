//! HTTP routes for the payment endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    get_payment, list_payments, payment_receipt, process_payment, update_payment_status,
    PaymentHandlers,
};

/// Creates the payment router.
pub fn payment_routes(handlers: PaymentHandlers) -> Router {
    Router::new()
        .route("/", post(process_payment))
        .route("/", get(list_payments))
        .route("/:id", get(get_payment))
        .route("/:id/status", put(update_payment_status))
        .route("/:id/receipt", get(payment_receipt))
        .with_state(handlers)
}
