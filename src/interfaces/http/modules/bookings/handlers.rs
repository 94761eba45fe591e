//! Booking HTTP handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;

use crate::application::booking::BookingSubmissionService;
use crate::domain::booking::BookingId;
use crate::domain::identity::{Actor, RequestContext};
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};

use super::dto::*;

#[derive(Clone)]
pub struct BookingsState {
    pub bookings: BookingSubmissionService,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Pending booking (new or resumed)", body = ApiResponse<BookingDto>),
        (status = 404, description = "Venue or resumed booking not found"),
        (status = 409, description = "Slot already taken"),
        (status = 422, description = "Invalid slot or contact details")
    )
)]
pub async fn create_booking(
    State(state): State<BookingsState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> ApiResult<BookingDto> {
    let ctx = RequestContext::new(actor).resuming(request.resume_id());
    let booking = state
        .bookings
        .submit(&ctx, request.into_booking_request())
        .await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingsState>,
    Path(id): Path<i32>,
) -> ApiResult<BookingDto> {
    let booking = state.bookings.get(BookingId(id)).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    params(PhoneQuery),
    responses(
        (status = 200, description = "Bookings made with this phone, newest first", body = ApiResponse<Vec<BookingDto>>),
        (status = 422, description = "Phone missing")
    )
)]
pub async fn find_bookings(
    State(state): State<BookingsState>,
    Query(query): Query<PhoneQuery>,
) -> ApiResult<Vec<BookingDto>> {
    let bookings = state.bookings.find_by_phone(query.phone.trim()).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Cancelled booking", body = ApiResponse<BookingDto>),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is already settled")
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingsState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> ApiResult<BookingDto> {
    let ctx = RequestContext::new(actor);
    let booking = state.bookings.cancel(&ctx, BookingId(id)).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/open-matches",
    tag = "Bookings",
    responses(
        (status = 200, description = "Paid upcoming bookings looking for an opponent", body = ApiResponse<Vec<BookingDto>>)
    )
)]
pub async fn open_matches(State(state): State<BookingsState>) -> ApiResult<Vec<BookingDto>> {
    let bookings = state.bookings.open_matches(Utc::now()).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}
