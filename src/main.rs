//! Stayline backend binary.
//!
//! Startup order: load + validate configuration (fails hard when the JWT
//! signing secret or the Stripe secret key is absent), initialize tracing,
//! connect the database pool, wire adapters into the services, serve.

use std::sync::Arc;

use axum::{middleware, Router};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stayline::adapters::auth::JwtTokenVerifier;
use stayline::adapters::email::ResendMailer;
use stayline::adapters::http::middleware::{auth_middleware, AuthState};
use stayline::adapters::http::otp::{otp_routes, OtpHandlers};
use stayline::adapters::http::payment::{payment_routes, PaymentHandlers};
use stayline::adapters::postgres::{
    PostgresBookingStore, PostgresOtpStore, PostgresPaymentStore, PostgresUserDirectory,
};
use stayline::adapters::stripe::{StripeConfig, StripeGateway};
use stayline::adapters::websocket::{
    gateway_routes, ConnectionRegistry, GatewayState, NotificationRouter, RoomManager,
};
use stayline::application::{BankTransferDetails, OtpService, PaymentService};
use stayline::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    config.validate()?;
    tracing::info!(
        environment = ?config.server.environment,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Real-time gateway.
    let registry = Arc::new(ConnectionRegistry::new());
    let rooms = Arc::new(RoomManager::new());
    let notification_router = Arc::new(NotificationRouter::new(
        Arc::clone(&registry),
        Arc::clone(&rooms),
    ));
    let verifier: AuthState = Arc::new(JwtTokenVerifier::new(&config.auth.jwt_secret));
    let gateway_state = GatewayState::new(
        registry,
        rooms,
        Arc::clone(&notification_router),
        Arc::clone(&verifier),
    )
    .with_handshake_timeout(config.auth.handshake_timeout());

    // Stores and external collaborators.
    let otp_store = Arc::new(PostgresOtpStore::new(pool.clone()));
    let payment_store = Arc::new(PostgresPaymentStore::new(pool.clone()));
    let booking_store = Arc::new(PostgresBookingStore::new(pool.clone()));
    let users = Arc::new(PostgresUserDirectory::new(pool));
    let mailer = Arc::new(ResendMailer::new(&config.email));
    let gateway = Arc::new(StripeGateway::new(
        StripeConfig::new(config.payment.stripe_secret_key.expose_secret())
            .with_request_timeout(config.payment.request_timeout()),
    ));

    // Orchestrators.
    let otp_service = Arc::new(OtpService::new(
        otp_store,
        Arc::clone(&users) as _,
        Arc::clone(&mailer) as _,
        Arc::clone(&notification_router) as _,
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_store,
        booking_store,
        gateway,
        users,
        mailer,
        notification_router,
        BankTransferDetails {
            account_name: config.payment.bank_account_name.clone(),
            account_number: config.payment.bank_account_number.clone(),
            bank_name: config.payment.bank_name.clone(),
        },
    ));

    let cors = build_cors(&config);
    let app = Router::new()
        .nest("/api/v1/otp", otp_routes(OtpHandlers::new(otp_service)))
        .nest(
            "/api/v1/payment",
            payment_routes(PaymentHandlers::new(payment_service)),
        )
        .merge(gateway_routes(gateway_state))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(middleware::from_fn_with_state(verifier, auth_middleware)),
        );

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::list(parsed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
