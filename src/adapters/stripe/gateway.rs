//! Stripe payment-intent creation.
//!
//! One call per card payment: create an intent, hand the client secret back
//! to the frontend. Amounts are converted to the provider's minor-unit
//! convention on the way out. Every request carries a bounded timeout so a
//! stalled provider fails the payment instead of hanging it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Platform;
use crate::ports::{CreateIntentRequest, GatewayError, PaymentGateway, PaymentIntent};

/// Shared HTTP client; per-request timeouts come from the config.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Default bound on a gateway request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Bound on a single request.
    request_timeout: Duration,
}

impl StripeConfig {
    /// Creates a configuration with the given secret key.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// `PaymentGateway` backed by the Stripe payment-intents API.
pub struct StripeGateway {
    config: StripeConfig,
}

impl StripeGateway {
    /// Creates a gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    /// Provider-side payment method types per platform.
    ///
    /// Mobile submissions may settle through mobile money in addition to
    /// cards; web is card-only.
    fn method_types(platform: Platform) -> &'static [&'static str] {
        match platform {
            Platform::Mobile => &["card", "mobile_money"],
            Platform::Web => &["card"],
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        // Stripe takes amounts in minor units.
        let amount_minor = request.amount * 100;

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), amount_minor.to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                "metadata[platform]".to_string(),
                request.platform.as_str().to_string(),
            ),
        ];
        for (i, method) in Self::method_types(request.platform).iter().enumerate() {
            form.push((format!("payment_method_types[{}]", i), (*method).to_string()));
        }

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .timeout(self.config.request_timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Authentication);
        }
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(GatewayError::Rejected(message));
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            GatewayError::InvalidResponse("payment intent missing client_secret".to_string())
        })?;

        tracing::info!(
            intent_id = %intent.id,
            amount = request.amount,
            currency = %request.currency,
            platform = %request.platform,
            "Payment intent created"
        );

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
        })
    }
}
