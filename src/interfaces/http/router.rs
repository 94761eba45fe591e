//! API Router with Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::booking::{
    BookingSubmissionService, PaymentInitiator, PaymentReconciler, PollerConfig,
    SlotAvailabilityResolver,
};
use crate::domain::payment::PaymentProvider;
use crate::domain::slot::SlotGrid;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{bookings, health, metrics, payments, slots};
use crate::interfaces::ws::{ws_booking_status_handler, WatchState};
use crate::shared::retry::RetryConfig;

/// Knobs the HTTP layer needs besides the stores and the provider.
#[derive(Clone)]
pub struct ApiSettings {
    pub jwt: JwtConfig,
    /// Shared secret for notification signatures
    pub server_key: String,
    pub payment_retry: RetryConfig,
    pub payment_timeout: Duration,
    pub poller: PollerConfig,
}

/// Unified router state. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub availability: SlotAvailabilityResolver,
    pub bookings: BookingSubmissionService,
    pub payments: PaymentInitiator,
    pub reconciler: PaymentReconciler,
    pub poller: PollerConfig,
    pub auth: AuthState,
    pub server_key: String,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        grid: Arc<SlotGrid>,
        provider: Arc<dyn PaymentProvider>,
        settings: ApiSettings,
    ) -> Self {
        let bookings = BookingSubmissionService::new(repos.clone(), grid.clone());
        Self {
            availability: SlotAvailabilityResolver::new(repos.clone(), grid),
            payments: PaymentInitiator::new(
                repos.clone(),
                provider.clone(),
                settings.payment_retry,
                settings.payment_timeout,
            ),
            reconciler: PaymentReconciler::new(bookings.clone(), provider),
            bookings,
            repos,
            poller: settings.poller,
            auth: AuthState {
                jwt_config: settings.jwt,
            },
            server_key: settings.server_key,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiState> for slots::SlotsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            availability: s.availability.clone(),
        }
    }
}

impl FromRef<ApiState> for bookings::BookingsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            bookings: s.bookings.clone(),
        }
    }
}

impl FromRef<ApiState> for payments::PaymentsState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            payments: s.payments.clone(),
            reconciler: s.reconciler.clone(),
            server_key: s.server_key.clone(),
        }
    }
}

impl FromRef<ApiState> for WatchState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            reconciler: s.reconciler.clone(),
            poller: s.poller.clone(),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        Self {
            repos: s.repos.clone(),
            started_at: s.started_at.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        slots::list_slots,
        bookings::create_booking,
        bookings::get_booking,
        bookings::find_bookings,
        bookings::cancel_booking,
        bookings::open_matches,
        payments::initiate_payment,
        payments::payment_notification,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            slots::SlotDto,
            slots::ScheduleResponse,
            bookings::CreateBookingRequest,
            bookings::BookingDto,
            payments::PaymentHandleDto,
            payments::PaymentNotificationRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Schedule", description = "Daily slot grid with availability"),
        (name = "Bookings", description = "Reservation submission, lookup and cancellation"),
        (name = "Payments", description = "Payment initiation and provider notifications"),
    ),
    info(
        title = "Venue Booking API",
        version = "1.0.0",
        description = "Slot availability, bookings and payment reconciliation for sports venues",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: ApiState, prometheus: PrometheusHandle) -> Router {
    let auth = middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let api_routes = Router::new()
        // Schedule
        .route("/venues/{venue_id}/slots", get(slots::list_slots))
        // Bookings (reads are public, writes need a token)
        .route(
            "/bookings",
            get(bookings::find_bookings)
                .merge(post(bookings::create_booking).route_layer(auth.clone())),
        )
        .route("/bookings/{id}", get(bookings::get_booking))
        .route(
            "/bookings/{id}/cancel",
            post(bookings::cancel_booking).route_layer(auth.clone()),
        )
        .route("/bookings/{id}/watch", get(ws_booking_status_handler))
        .route("/open-matches", get(bookings::open_matches))
        // Payments
        .route(
            "/payments/bookings/{id}",
            post(payments::initiate_payment).route_layer(auth),
        )
        .route("/payments/notifications", post(payments::payment_notification))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState { handle: prometheus });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .with_state(state)
        .merge(metrics_routes)
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::booking::test_support::{request_at, setup, FakeProvider};
    use crate::domain::booking::{BookingId, BookingStatus};
    use crate::domain::identity::Role;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::payment::notification_signature;

    const SERVER_KEY: &str = "test-server-key";

    fn jwt() -> JwtConfig {
        JwtConfig::new("router-secret", "venue-booking")
    }

    fn app() -> (Router, Arc<FakeProvider>) {
        let (repos, grid) = setup();
        let provider = Arc::new(FakeProvider::default());
        let state = ApiState::new(
            repos,
            grid,
            provider.clone(),
            ApiSettings {
                jwt: jwt(),
                server_key: SERVER_KEY.into(),
                payment_retry: RetryConfig::default().with_max_attempts(1),
                payment_timeout: Duration::from_secs(1),
                poller: PollerConfig::default(),
            },
        );
        let prometheus = PrometheusBuilder::new().build_recorder().handle();
        (create_api_router(state, prometheus), provider)
    }

    fn bearer() -> String {
        format!("Bearer {}", create_token("cust-1", Role::Customer, &jwt()).unwrap())
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn booking_body(hour: u32, phone: &str) -> Value {
        let req = request_at(hour, phone);
        json!({
            "venue_id": req.venue_id.0,
            "start_time": req.start_time,
            "end_time": req.end_time,
            "customer_name": "Budi",
            "customer_phone": phone,
            "seeking_opponent": true,
        })
    }

    async fn create_booking(app: &Router, hour: u32) -> i64 {
        let (status, json) = call(
            app,
            post_json("/api/v1/bookings", booking_body(hour, "08111111"), Some(&bearer())),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        json["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn schedule_lists_every_slot() {
        let (app, _) = app();
        let (status, json) = call(&app, get("/api/v1/venues/1/slots?date=2026-03-14")).await;
        assert_eq!(status, StatusCode::OK);
        let slots = json["data"]["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0]["label"], "08:00 - 09:00");
        assert_eq!(slots[4]["status"], "closed");
        assert_eq!(slots[1]["status"], "available");

        let (status, _) = call(&app, get("/api/v1/venues/99/slots?date=2026-03-14")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn writes_require_a_token() {
        let (app, _) = app();
        let (status, json) =
            call(&app, post_json("/api/v1/bookings", booking_body(9, "0811111"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);

        let (status, _) = call(
            &app,
            post_json("/api/v1/bookings", booking_body(9, "0811111"), Some("Bearer junk")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn booking_then_conflict_then_booked_slot() {
        let (app, _) = app();
        let (status, json) = call(
            &app,
            post_json("/api/v1/bookings", booking_body(9, "08111111"), Some(&bearer())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "PENDING");
        assert_eq!(json["data"]["total_price"], 100);
        assert_eq!(json["data"]["order_id"], format!("booking-{}", json["data"]["id"]));

        let (status, json) = call(
            &app,
            post_json("/api/v1/bookings", booking_body(9, "08222222"), Some(&bearer())),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json["error"].as_str().unwrap().contains("taken"));

        let (_, json) = call(&app, get("/api/v1/venues/1/slots?date=2026-03-14")).await;
        assert_eq!(json["data"]["slots"][1]["status"], "booked");
    }

    #[tokio::test]
    async fn resume_returns_the_existing_booking() {
        let (app, _) = app();
        let id = create_booking(&app, 10).await;

        let mut body = booking_body(10, "08111111");
        body["existing_booking_id"] = json!(id);
        let (status, json) = call(&app, post_json("/api/v1/bookings", body, Some(&bearer()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"].as_i64(), Some(id));
    }

    #[tokio::test]
    async fn invalid_input_is_422() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            post_json("/api/v1/bookings", booking_body(9, "1"), Some(&bearer())),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // 12:00 local is a closed slot.
        let (status, json) = call(
            &app,
            post_json("/api/v1/bookings", booking_body(12, "08111111"), Some(&bearer())),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("closed"));
    }

    #[tokio::test]
    async fn lookup_by_id_and_phone() {
        let (app, _) = app();
        let id = create_booking(&app, 9).await;

        let (status, json) = call(&app, get(&format!("/api/v1/bookings/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["customer_phone"], "08111111");

        let (status, json) = call(&app, get("/api/v1/bookings?phone=08111111")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);

        let (status, _) = call(&app, get("/api/v1/bookings/4242")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cancel_only_once() {
        let (app, _) = app();
        let id = create_booking(&app, 9).await;
        let uri = format!("/api/v1/bookings/{}/cancel", id);

        let (status, json) = call(&app, post_json(&uri, json!({}), Some(&bearer()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "CANCELLED");

        let (status, json) = call(&app, post_json(&uri, json!({}), Some(&bearer()))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn payment_initiation_and_upstream_failure() {
        let (app, provider) = app();
        let id = create_booking(&app, 9).await;
        let uri = format!("/api/v1/payments/bookings/{}", id);

        let (status, json) = call(&app, post_json(&uri, json!({}), Some(&bearer()))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["redirect_url"].as_str().unwrap().contains(&format!("booking-{}", id)));
        assert_eq!(json["data"]["amount"], 100);

        provider.fail_next_sessions(1);
        let (status, _) = call(&app, post_json(&uri, json!({}), Some(&bearer()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn signed_notification_settles_booking() {
        let (app, _) = app();
        let id = create_booking(&app, 9).await;
        let order_id = BookingId(id as i32).order_id();

        let mut notification = json!({
            "order_id": order_id,
            "status_code": "200",
            "gross_amount": "100.00",
            "signature_key": "bogus",
            "transaction_status": "settlement",
        });
        let (status, _) = call(
            &app,
            post_json("/api/v1/payments/notifications", notification.clone(), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        notification["signature_key"] =
            json!(notification_signature(&order_id, "200", "100.00", SERVER_KEY));
        let (status, json) = call(
            &app,
            post_json("/api/v1/payments/notifications", notification.clone(), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], BookingStatus::Paid.as_str());

        // A replay is harmless.
        let (status, json) =
            call(&app, post_json("/api/v1/payments/notifications", notification, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "PAID");

        // Paid bookings with seeking_opponent show up as open matches once
        // their slot lies ahead; 2026-03-14 is in the past here, so none do.
        let (status, json) = call(&app, get("/api/v1/open-matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"].as_array().is_some());
    }

    #[tokio::test]
    async fn health_and_metrics_are_public() {
        let (app, _) = app();
        let (status, json) = call(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["storage"]["status"], "ok");

        let resp = app.clone().oneshot(get("/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn openapi_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/bookings"));
        assert!(doc.paths.paths.contains_key("/api/v1/payments/notifications"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
