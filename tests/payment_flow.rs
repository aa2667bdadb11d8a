//! End-to-end payment lifecycle scenarios against the in-memory stores, the
//! mock gateway and the real notification router.

use std::sync::Arc;

use stayline::adapters::email::MockMailer;
use stayline::adapters::memory::{
    InMemoryBookingStore, InMemoryPaymentStore, InMemoryUserDirectory,
};
use stayline::adapters::stripe::MockPaymentGateway;
use stayline::adapters::websocket::{ConnectionRegistry, NotificationRouter, RoomManager};
use stayline::application::{
    BankTransferDetails, PaymentInstructions, PaymentService, ProcessPaymentRequest,
};
use stayline::domain::booking::{Booking, BookingStatus};
use stayline::domain::foundation::{BookingId, ErrorCode, PaymentId, Platform, Role, UserId};
use stayline::domain::payment::{PaymentMethod, PaymentStatus};
use stayline::ports::{BookingStore, GatewayError, PaymentStore, UserRecord};

struct World {
    payments: Arc<InMemoryPaymentStore>,
    bookings: Arc<InMemoryBookingStore>,
    registry: Arc<ConnectionRegistry>,
    service: Arc<PaymentService>,
}

fn world_with_gateway(gateway: MockPaymentGateway) -> World {
    let payments = Arc::new(InMemoryPaymentStore::new());
    let bookings = Arc::new(InMemoryBookingStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let rooms = Arc::new(RoomManager::new());
    let router = Arc::new(NotificationRouter::new(Arc::clone(&registry), rooms));

    users.seed(UserRecord {
        id: UserId::new("payer-1").unwrap(),
        email: "payer@x.com".to_string(),
        role: Role::User,
        is_email_verified: true,
    });

    let service = Arc::new(PaymentService::new(
        Arc::clone(&payments) as _,
        Arc::clone(&bookings) as _,
        Arc::new(gateway),
        users,
        Arc::new(MockMailer::new()),
        router,
        BankTransferDetails {
            account_name: Some("Stayline Ltd".to_string()),
            account_number: Some("0001112223".to_string()),
            bank_name: Some("First Bank".to_string()),
        },
    ));

    World {
        payments,
        bookings,
        registry,
        service,
    }
}

fn world() -> World {
    world_with_gateway(MockPaymentGateway::new())
}

fn card_request(booking_id: Option<BookingId>) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        user_id: UserId::new("payer-1").unwrap(),
        amount: 5000,
        currency: "usd".to_string(),
        method: PaymentMethod::Card,
        booking_id,
        description: Some("Two nights at the lakeside cabin".to_string()),
        extra: serde_json::Map::new(),
    }
}

fn seed_booking(world: &World) -> BookingId {
    let id = BookingId::new();
    world.bookings.seed(Booking {
        id,
        user_id: UserId::new("payer-1").unwrap(),
        status: BookingStatus::Pending,
        payment_ref: None,
    });
    id
}

fn payment_id(instructions: &PaymentInstructions) -> PaymentId {
    match instructions {
        PaymentInstructions::Card { payment_id, .. }
        | PaymentInstructions::BankTransfer { payment_id, .. }
        | PaymentInstructions::MobileMoney { payment_id, .. }
        | PaymentInstructions::Cash { payment_id, .. } => *payment_id,
    }
}

#[tokio::test]
async fn failed_gateway_call_leaves_payment_failed_and_booking_untouched() {
    let world = world_with_gateway(
        MockPaymentGateway::new().with_error(GatewayError::Rejected("card_declined".to_string())),
    );
    let booking_id = seed_booking(&world);

    let err = world
        .service
        .process(card_request(Some(booking_id)), Platform::Web)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GatewayError);

    let stored = world.payments.list(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status(), PaymentStatus::Failed);

    let booking = world.bookings.find_by_id(&booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
}

#[tokio::test]
async fn card_payment_processes_then_succeeds_and_confirms_booking_once() {
    let world = world();
    let booking_id = seed_booking(&world);

    let instructions = world
        .service
        .process(card_request(Some(booking_id)), Platform::Web)
        .await
        .unwrap();
    let id = payment_id(&instructions);

    let processing = world.payments.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(processing.status(), PaymentStatus::Processing);
    assert!(processing.gateway_ref().is_some());

    // Admin confirms twice; the booking confirms exactly once.
    world
        .service
        .update_status(&id, PaymentStatus::Success)
        .await
        .unwrap();
    world
        .service
        .update_status(&id, PaymentStatus::Success)
        .await
        .unwrap();

    let booking = world.bookings.find_by_id(&booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_ref, Some(id));
}

#[tokio::test]
async fn payment_never_leaves_a_terminal_status() {
    let world = world();

    let instructions = world
        .service
        .process(card_request(None), Platform::Web)
        .await
        .unwrap();
    let id = payment_id(&instructions);

    world
        .service
        .update_status(&id, PaymentStatus::Failed)
        .await
        .unwrap();

    for next in [PaymentStatus::Pending, PaymentStatus::Processing, PaymentStatus::Success] {
        let err = world.service.update_status(&id, next).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    let stored = world.payments.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status(), PaymentStatus::Failed);
}

#[tokio::test]
async fn offline_methods_stay_pending_with_instructions() {
    let world = world();

    let mut request = card_request(None);
    request.method = PaymentMethod::BankTransfer;
    let instructions = world.service.process(request, Platform::Web).await.unwrap();

    let PaymentInstructions::BankTransfer { status, bank_details, .. } = instructions else {
        panic!("expected bank transfer instructions");
    };
    assert_eq!(status, PaymentStatus::Pending);
    assert_eq!(bank_details.account_name.as_deref(), Some("Stayline Ltd"));
}

#[tokio::test]
async fn success_pushes_notification_and_payment_broadcast_to_live_connection() {
    let world = world();
    let booking_id = seed_booking(&world);

    // The payer has a live mobile session; an unrelated user is also online.
    let (payer_tx, mut payer_rx) = tokio::sync::mpsc::unbounded_channel();
    world
        .registry
        .register(UserId::new("payer-1").unwrap(), Platform::Mobile, payer_tx)
        .await;
    let (other_tx, mut other_rx) = tokio::sync::mpsc::unbounded_channel();
    world
        .registry
        .register(UserId::new("bystander").unwrap(), Platform::Web, other_tx)
        .await;

    let instructions = world
        .service
        .process(card_request(Some(booking_id)), Platform::Mobile)
        .await
        .unwrap();
    world
        .service
        .update_status(&payment_id(&instructions), PaymentStatus::Success)
        .await
        .unwrap();

    // Payer gets the targeted notification first, then the broadcast.
    let first = serde_json::to_value(payer_rx.try_recv().unwrap()).unwrap();
    assert_eq!(first["event"], "notification");
    assert_eq!(first["data"]["type"], "PAYMENT_SUCCESS");
    assert_eq!(first["data"]["data"]["receiptAvailable"], true);

    let second = serde_json::to_value(payer_rx.try_recv().unwrap()).unwrap();
    assert_eq!(second["event"], "payment");

    // The bystander only sees the broadcast.
    let bystander = serde_json::to_value(other_rx.try_recv().unwrap()).unwrap();
    assert_eq!(bystander["event"], "payment");
    assert!(other_rx.try_recv().is_err());
}

#[tokio::test]
async fn receipt_reflects_submitting_platform() {
    let world = world();

    let instructions = world
        .service
        .process(card_request(None), Platform::Mobile)
        .await
        .unwrap();
    let id = payment_id(&instructions);

    // Not successful yet - no receipt.
    assert!(world.service.receipt(&id).await.is_err());

    world
        .service
        .update_status(&id, PaymentStatus::Success)
        .await
        .unwrap();

    let receipt = world.service.receipt(&id).await.unwrap();
    assert!(receipt.receipt_id.starts_with("REC-"));
    assert!(receipt.download_url.contains("receipts/mobile/"));
    assert_eq!(receipt.amount, 5000);
}
