//! Mock payment gateway for testing.
//!
//! Supports pre-configured intents, error injection and call tracking.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{CreateIntentRequest, GatewayError, PaymentGateway, PaymentIntent};

#[derive(Default)]
struct MockState {
    /// Intent returned by the next call, if set.
    next_intent: Option<PaymentIntent>,

    /// Error returned by every call, if set.
    forced_error: Option<GatewayError>,

    /// Every request seen, for assertions.
    calls: Vec<CreateIntentRequest>,
}

/// Mock `PaymentGateway`.
///
/// By default every call succeeds with a generated intent; configure a
/// forced error to exercise the failure path.
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockPaymentGateway {
    /// Creates a mock that succeeds with generated intents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a specific intent on the next call.
    pub fn with_intent(self, intent: PaymentIntent) -> Self {
        self.state.lock().unwrap().next_intent = Some(intent);
        self
    }

    /// Fails every call with the given error.
    pub fn with_error(self, error: GatewayError) -> Self {
        self.state.lock().unwrap().forced_error = Some(error);
        self
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<CreateIntentRequest> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(request);

        if let Some(error) = state.forced_error.clone() {
            return Err(error);
        }

        Ok(state.next_intent.take().unwrap_or_else(|| {
            let suffix = Uuid::new_v4().simple().to_string();
            PaymentIntent {
                id: format!("pi_{}", &suffix[..12]),
                client_secret: format!("pi_{}_secret", &suffix[..12]),
            }
        }))
    }
}
