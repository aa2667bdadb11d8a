//! PaymentService - Orchestrates the payment lifecycle.
//!
//! Composes the payment store, the booking store, the external gateway and
//! the notifier. Card payments go `PENDING → PROCESSING` against the
//! gateway; offline methods stay `PENDING` with instructions until an
//! administrator confirms them through `update_status`.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, PaymentId, Platform, Timestamp, UserId,
};
use crate::domain::payment::{
    Applied, Payment, PaymentMetadata, PaymentMethod, PaymentStatus,
};
use crate::ports::{
    BookingStore, BroadcastEvent, CreateIntentRequest, Mailer, Notification, Notifier,
    PaymentGateway, PaymentStore, UserDirectory,
};

/// Bank account details returned with bank-transfer instructions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BankTransferDetails {
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
}

/// A payment submission.
#[derive(Debug, Clone)]
pub struct ProcessPaymentRequest {
    pub user_id: UserId,
    pub amount: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub booking_id: Option<BookingId>,
    pub description: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What the caller needs to complete a submitted payment.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PaymentInstructions {
    /// Card payment: finish client-side with the gateway client secret.
    #[serde(rename_all = "camelCase")]
    Card {
        payment_id: PaymentId,
        client_secret: String,
        platform: Platform,
    },

    /// Bank transfer: pay into this account, then await manual confirmation.
    #[serde(rename_all = "camelCase")]
    BankTransfer {
        payment_id: PaymentId,
        status: PaymentStatus,
        bank_details: BankTransferDetails,
    },

    /// Mobile money: complete through the named provider.
    #[serde(rename_all = "camelCase")]
    MobileMoney {
        payment_id: PaymentId,
        status: PaymentStatus,
        provider: String,
        phone_number: Option<String>,
    },

    /// Cash: awaiting manual confirmation.
    #[serde(rename_all = "camelCase")]
    Cash {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
}

/// Receipt for a successful payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub receipt_id: String,
    pub payment_id: PaymentId,
    pub amount: i64,
    pub currency: String,
    pub generated_at: Timestamp,
    pub platform: Platform,
    pub format: ReceiptFormat,
    pub download_url: String,
}

/// Receipt rendering per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptFormat {
    Mobile,
    Pdf,
}

/// Orchestrator for the payment status lifecycle.
pub struct PaymentService {
    payments: Arc<dyn PaymentStore>,
    bookings: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn Notifier>,
    bank_details: BankTransferDetails,
}

impl PaymentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        bookings: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
        bank_details: BankTransferDetails,
    ) -> Self {
        Self {
            payments,
            bookings,
            gateway,
            users,
            mailer,
            notifier,
            bank_details,
        }
    }

    /// Persists a new `PENDING` payment and dispatches per method.
    pub async fn process(
        &self,
        request: ProcessPaymentRequest,
        platform: Platform,
    ) -> Result<PaymentInstructions, DomainError> {
        let metadata = PaymentMetadata {
            booking_id: request.booking_id,
            platform,
            extra: request.extra,
        };
        let mut payment = Payment::new(
            request.user_id,
            request.amount,
            request.currency,
            request.method,
            request.description,
            metadata,
        );
        self.payments.insert(&payment).await?;

        tracing::info!(
            payment_id = %payment.id(),
            method = %payment.method(),
            amount = payment.amount(),
            platform = %platform,
            "Payment submitted"
        );

        match request.method {
            PaymentMethod::Card => self.process_card(payment, platform).await,
            PaymentMethod::BankTransfer => Ok(PaymentInstructions::BankTransfer {
                payment_id: payment.id(),
                status: payment.status(),
                bank_details: self.bank_details.clone(),
            }),
            PaymentMethod::MobileMoney => {
                let provider = payment
                    .metadata()
                    .extra
                    .get("provider")
                    .and_then(|v| v.as_str())
                    .unwrap_or("default")
                    .to_string();
                let phone_number = payment
                    .metadata()
                    .extra
                    .get("phoneNumber")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                Ok(PaymentInstructions::MobileMoney {
                    payment_id: payment.id(),
                    status: payment.status(),
                    provider,
                    phone_number,
                })
            }
            PaymentMethod::Cash => Ok(PaymentInstructions::Cash {
                payment_id: payment.id(),
                status: payment.status(),
            }),
        }
    }

    /// Card dispatch: create the gateway intent, store the reference, move
    /// to `PROCESSING`. A gateway failure marks the payment `FAILED` and
    /// re-raises the error.
    async fn process_card(
        &self,
        mut payment: Payment,
        platform: Platform,
    ) -> Result<PaymentInstructions, DomainError> {
        let intent = self
            .gateway
            .create_intent(CreateIntentRequest {
                amount: payment.amount(),
                currency: payment.currency().to_string(),
                platform,
            })
            .await;

        match intent {
            Ok(intent) => {
                payment.begin_processing(intent.id)?;
                self.payments.update(&payment).await?;
                Ok(PaymentInstructions::Card {
                    payment_id: payment.id(),
                    client_secret: intent.client_secret,
                    platform,
                })
            }
            Err(e) => {
                tracing::error!(
                    payment_id = %payment.id(),
                    error = %e,
                    "Gateway rejected payment intent"
                );
                payment.fail()?;
                self.payments.update(&payment).await?;
                Err(e.into())
            }
        }
    }

    /// Administrative status update.
    ///
    /// Transitions are forward-only and a repeated update with the current
    /// status is a no-op. The success cascade - booking confirmation,
    /// notification push, `payment` broadcast, receipt email - runs only
    /// when the status actually changed, and booking confirmation is a
    /// compare-and-swap on top of that, so two racing SUCCESS updates still
    /// confirm at most once.
    pub async fn update_status(
        &self,
        id: &PaymentId,
        new_status: PaymentStatus,
    ) -> Result<Payment, DomainError> {
        let mut payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::payment_not_found(id))?;

        let applied = payment.transition_to(new_status)?;
        if applied == Applied::AlreadyInState {
            return Ok(payment);
        }
        self.payments.update(&payment).await?;

        tracing::info!(
            payment_id = %payment.id(),
            status = %new_status,
            "Payment status updated"
        );

        if new_status == PaymentStatus::Success {
            self.apply_success_cascade(&payment).await?;
        }

        Ok(payment)
    }

    /// Side effects of reaching `SUCCESS`.
    async fn apply_success_cascade(&self, payment: &Payment) -> Result<(), DomainError> {
        if let Some(booking_id) = payment.metadata().booking_id {
            let confirmed = self.bookings.confirm_once(&booking_id, payment.id()).await?;
            if confirmed {
                tracing::info!(
                    booking_id = %booking_id,
                    payment_id = %payment.id(),
                    "Booking confirmed"
                );
            } else {
                tracing::warn!(
                    booking_id = %booking_id,
                    payment_id = %payment.id(),
                    "Booking already confirmed or missing; cascade skipped"
                );
            }
        }

        let notification = Notification::new(
            "Payment Successful",
            format!(
                "Your payment of {} {} was successful",
                payment.amount(),
                payment.currency().to_uppercase()
            ),
        )
        .with_kind("PAYMENT_SUCCESS")
        .with_data(serde_json::json!({
            "paymentId": payment.id(),
            "bookingId": payment.metadata().booking_id,
            "receiptAvailable": true,
        }));
        self.notifier.notify(payment.user_id(), notification).await;

        self.notifier
            .broadcast(
                BroadcastEvent::Payment,
                serde_json::json!({
                    "paymentId": payment.id(),
                    "status": payment.status(),
                }),
                Some(payment.metadata().platform),
            )
            .await;

        // Receipt email is best-effort; the status update already happened.
        match self.users.find_by_id(payment.user_id()).await {
            Ok(Some(user)) => {
                let reference = payment
                    .gateway_ref()
                    .map(String::from)
                    .unwrap_or_else(|| payment.id().to_string());
                if let Err(e) = self
                    .mailer
                    .send_payment_receipt(
                        &user.email,
                        payment.amount(),
                        payment.currency(),
                        &reference,
                    )
                    .await
                {
                    tracing::warn!(
                        payment_id = %payment.id(),
                        error = %e,
                        "Receipt email failed"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(user_id = %payment.user_id(), "Payer not found; no receipt email");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Payer lookup failed; no receipt email");
            }
        }

        Ok(())
    }

    /// Lists payments, optionally filtered by submitting platform.
    pub async fn list(&self, platform: Option<Platform>) -> Result<Vec<Payment>, DomainError> {
        self.payments.list(platform).await
    }

    /// Fetches a payment by id.
    pub async fn get(&self, id: &PaymentId) -> Result<Payment, DomainError> {
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::payment_not_found(id))
    }

    /// Generates a receipt for a successful payment.
    pub async fn receipt(&self, id: &PaymentId) -> Result<PaymentReceipt, DomainError> {
        let payment = self.get(id).await?;

        if payment.status() != PaymentStatus::Success {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "Receipts are only available for successful payments",
            ));
        }

        let platform = payment.metadata().platform;
        let (format, download_url) = match platform {
            Platform::Mobile => (
                ReceiptFormat::Mobile,
                format!("receipts/mobile/{}.pdf", payment.id()),
            ),
            Platform::Web => (
                ReceiptFormat::Pdf,
                format!("receipts/web/{}.pdf", payment.id()),
            ),
        };

        Ok(PaymentReceipt {
            receipt_id: format!("REC-{}", Timestamp::now().as_datetime().timestamp_millis()),
            payment_id: payment.id(),
            amount: payment.amount(),
            currency: payment.currency().to_string(),
            generated_at: Timestamp::now(),
            platform,
            format,
            download_url,
        })
    }
}
