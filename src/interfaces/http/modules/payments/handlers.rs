//! Payment HTTP handlers

use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::warn;

use crate::application::booking::{PaymentInitiator, PaymentReconciler};
use crate::domain::booking::BookingId;
use crate::domain::identity::Actor;
use crate::infrastructure::payment::verify_notification_signature;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult};
use crate::interfaces::http::modules::bookings::BookingDto;

use super::dto::*;

#[derive(Clone)]
pub struct PaymentsState {
    pub payments: PaymentInitiator,
    pub reconciler: PaymentReconciler,
    /// Shared secret the provider signs notifications with
    pub server_key: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/bookings/{id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Payment redirect handle", body = ApiResponse<PaymentHandleDto>),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Booking is no longer pending"),
        (status = 502, description = "Payment provider rejected the request"),
        (status = 503, description = "Payment provider unreachable")
    )
)]
pub async fn initiate_payment(
    State(state): State<PaymentsState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> ApiResult<PaymentHandleDto> {
    tracing::debug!(booking_id = id, actor = %actor.id, "Payment requested");
    let handle = state.payments.initiate(BookingId(id)).await?;
    Ok(Json(ApiResponse::success(handle.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/notifications",
    tag = "Payments",
    request_body = PaymentNotificationRequest,
    responses(
        (status = 200, description = "Notification applied; current booking", body = ApiResponse<BookingDto>),
        (status = 403, description = "Signature mismatch"),
        (status = 404, description = "Unknown order"),
        (status = 502, description = "Unrecognised transaction status")
    )
)]
pub async fn payment_notification(
    State(state): State<PaymentsState>,
    Json(body): Json<PaymentNotificationRequest>,
) -> ApiResult<BookingDto> {
    let valid = verify_notification_signature(
        &body.order_id,
        &body.status_code,
        &body.gross_amount,
        &state.server_key,
        &body.signature_key,
    );
    if !valid {
        warn!(order_id = %body.order_id, "Rejected payment notification with bad signature");
        return Err(ApiError::Forbidden("Invalid notification signature".into()));
    }

    let booking = state
        .reconciler
        .apply_notification(&body.to_notification())
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}
