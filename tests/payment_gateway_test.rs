// Integration tests for `HttpPaymentGateway` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use venue_booking::application::booking::{BookingRequest, BookingSubmissionService, PaymentInitiator};
use venue_booking::domain::booking::{BookingId, BookingStatus, Customer};
use venue_booking::domain::identity::{Actor, RequestContext, Role};
use venue_booking::domain::payment::{PaymentProvider, PaymentSessionRequest};
use venue_booking::domain::slot::SlotGrid;
use venue_booking::domain::venue::{NewVenue, SportType, VenueId};
use venue_booking::infrastructure::{
    HttpPaymentGateway, InMemoryRepositoryProvider, PaymentGatewayConfig,
};
use venue_booking::shared::retry::RetryConfig;
use venue_booking::DomainError;

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpPaymentGateway) {
    let server = MockServer::start().await;
    let gateway = HttpPaymentGateway::new(&PaymentGatewayConfig {
        base_url: server.uri(),
        server_key: "SB-test-key".into(),
        finish_url: Some("https://shop.test/finish".into()),
        request_timeout: Duration::from_millis(500),
    })
    .unwrap();
    (server, gateway)
}

fn session_request() -> PaymentSessionRequest {
    PaymentSessionRequest {
        booking_id: BookingId(12),
        order_id: BookingId(12).order_id(),
        amount: 100_000,
        customer: Customer::new("Budi", "08111111"),
        item_name: "Lapangan Futsal A 2026-03-14 09:00".into(),
    }
}

/// Booking service and initiator over in-memory storage, paying through `gateway`.
async fn booking_stack(gateway: HttpPaymentGateway) -> (BookingSubmissionService, PaymentInitiator) {
    let venue = NewVenue {
        name: "Lapangan Futsal A".into(),
        sport: SportType::Futsal,
        location: "Jl. Jamin Ginting No. 37".into(),
        price_per_hour: 100_000,
        facilities: BTreeSet::new(),
        image_url: None,
    }
    .into_venue(VenueId(1));
    let repos = Arc::new(InMemoryRepositoryProvider::with_venues([venue]));
    let grid = Arc::new(SlotGrid::new(8, 22, 60, [], 420).unwrap());
    let retry = RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        ..RetryConfig::default()
    };
    (
        BookingSubmissionService::new(repos.clone(), grid),
        PaymentInitiator::new(repos, Arc::new(gateway), retry, Duration::from_secs(1)),
    )
}

fn booking_request() -> BookingRequest {
    let start = Utc.with_ymd_and_hms(2026, 3, 14, 2, 0, 0).unwrap();
    BookingRequest {
        venue_id: VenueId(1),
        start_time: start,
        end_time: start + chrono::Duration::hours(1),
        customer: Customer::new("Budi", "08111111"),
    }
}

fn ctx() -> RequestContext {
    RequestContext::new(Actor::new("customer-1", Role::Customer))
}

fn sent_order_ids(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["transaction_details"]["order_id"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect()
}

async fn mount_status(server: &MockServer, order_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/status", order_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Session creation ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_session_sends_order_and_auth() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .and(header("authorization", "Basic U0ItdGVzdC1rZXk6"))
        .and(body_partial_json(json!({
            "transaction_details": { "order_id": "booking-12", "gross_amount": 100000 },
            "customer_details": { "first_name": "Budi", "phone": "08111111" },
            "callbacks": { "finish": "https://shop.test/finish" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "snap-token-1",
            "redirect_url": "https://pay.test/v2/vtweb/snap-token-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = gateway.create_payment_session(&session_request()).await.unwrap();
    assert_eq!(session.provider_ref, "snap-token-1");
    assert_eq!(session.redirect_url, "https://pay.test/v2/vtweb/snap-token-1");
}

#[tokio::test]
async fn test_create_session_refused_is_rejected() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error_messages": ["Access denied due to unauthorized transaction"]
        })))
        .mount(&server)
        .await;

    let result = gateway.create_payment_session(&session_request()).await;
    assert!(
        matches!(result, Err(DomainError::ProviderRejected(ref msg)) if msg.contains("401")),
        "expected ProviderRejected error, got: {result:?}"
    );
    assert!(!result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_second_session_uses_fresh_order_id() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "snap-token",
            "redirect_url": "https://pay.test/v2/vtweb/snap-token"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (bookings, payments) = booking_stack(gateway).await;
    let booking = bookings.submit(&ctx(), booking_request()).await.unwrap();
    payments.initiate(booking.id).await.unwrap();
    payments.initiate(booking.id).await.unwrap();

    let sent = sent_order_ids(&server.received_requests().await.unwrap());
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0], sent[1]);
    for order_id in &sent {
        assert_eq!(BookingId::from_order_id(order_id).unwrap(), booking.id);
    }
    assert_eq!(bookings.get(booking.id).await.unwrap().order_id(), sent[1]);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_messages": ["transaction_details.order_id has already been taken"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (bookings, payments) = booking_stack(gateway).await;
    let booking = bookings.submit(&ctx(), booking_request()).await.unwrap();
    let err = payments.initiate(booking.id).await.unwrap_err();
    assert!(matches!(err, DomainError::ProviderRejected(_)), "{err}");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    // Nothing was opened, so nothing is recorded.
    assert_eq!(bookings.get(booking.id).await.unwrap().order_id(), booking.id.order_id());
}

#[tokio::test]
async fn test_outage_is_retried_with_new_order_ids() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "snap-token",
            "redirect_url": "https://pay.test/v2/vtweb/snap-token"
        })))
        .mount(&server)
        .await;

    let (bookings, payments) = booking_stack(gateway).await;
    let booking = bookings.submit(&ctx(), booking_request()).await.unwrap();
    payments.initiate(booking.id).await.unwrap();

    let sent = sent_order_ids(&server.received_requests().await.unwrap());
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0], sent[1]);
    assert_eq!(bookings.get(booking.id).await.unwrap().order_id(), sent[1]);
}

#[tokio::test]
async fn test_slow_gateway_is_network_error() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/snap/v1/transactions"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "token": "t", "redirect_url": "u" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = gateway.create_payment_session(&session_request()).await;
    assert!(
        matches!(result, Err(DomainError::Network(_))),
        "expected Network error, got: {result:?}"
    );
}

// ── Status lookup ───────────────────────────────────────────────────

#[tokio::test]
async fn test_status_vocabulary() {
    let cases = [
        (json!({ "status_code": "200", "transaction_status": "settlement" }), BookingStatus::Paid),
        (
            json!({ "status_code": "200", "transaction_status": "capture", "fraud_status": "accept" }),
            BookingStatus::Paid,
        ),
        (
            json!({ "status_code": "201", "transaction_status": "capture", "fraud_status": "challenge" }),
            BookingStatus::Pending,
        ),
        (json!({ "status_code": "201", "transaction_status": "pending" }), BookingStatus::Pending),
        (json!({ "status_code": "202", "transaction_status": "deny" }), BookingStatus::Denied),
        (json!({ "status_code": "202", "transaction_status": "cancel" }), BookingStatus::Cancelled),
        (json!({ "status_code": "407", "transaction_status": "expire" }), BookingStatus::Expired),
    ];

    for (i, (body, expected)) in cases.into_iter().enumerate() {
        let (server, gateway) = setup().await;
        let id = BookingId(i as i32 + 1);
        mount_status(&server, &id.order_id(), body.clone()).await;
        let status = gateway.get_payment_status(&id.order_id()).await.unwrap();
        assert_eq!(status, expected, "for {body}");
    }
}

#[tokio::test]
async fn test_unknown_order_is_pending() {
    let (server, gateway) = setup().await;
    mount_status(
        &server,
        "booking-5",
        json!({ "status_code": "404", "status_message": "Transaction doesn't exist." }),
    )
    .await;
    assert_eq!(
        gateway.get_payment_status("booking-5").await.unwrap(),
        BookingStatus::Pending
    );

    // No mock mounted for booking-6: wiremock answers 404.
    assert_eq!(
        gateway.get_payment_status("booking-6").await.unwrap(),
        BookingStatus::Pending
    );
}

#[tokio::test]
async fn test_unrecognised_status_is_upstream() {
    let (server, gateway) = setup().await;
    mount_status(
        &server,
        "booking-7",
        json!({ "status_code": "200", "transaction_status": "refund" }),
    )
    .await;

    let result = gateway.get_payment_status("booking-7").await;
    assert!(
        matches!(result, Err(DomainError::Upstream(_))),
        "expected Upstream error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_gateway_outage_is_upstream() {
    let (server, gateway) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v2/booking-8/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = gateway.get_payment_status("booking-8").await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, DomainError::Upstream(_)));
}
