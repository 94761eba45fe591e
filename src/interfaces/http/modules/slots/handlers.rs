use axum::extract::{Path, Query, State};
use axum::Json;

use crate::application::booking::SlotAvailabilityResolver;
use crate::domain::venue::VenueId;
use crate::interfaces::http::common::{ApiResponse, ApiResult};

use super::dto::*;

#[derive(Clone)]
pub struct SlotsState {
    pub availability: SlotAvailabilityResolver,
}

#[utoipa::path(
    get,
    path = "/api/v1/venues/{venue_id}/slots",
    tag = "Schedule",
    params(("venue_id" = i32, Path, description = "Venue ID"), ScheduleQuery),
    responses(
        (status = 200, description = "Every slot of the day with its status", body = ApiResponse<ScheduleResponse>),
        (status = 404, description = "Venue not found")
    )
)]
pub async fn list_slots(
    State(state): State<SlotsState>,
    Path(venue_id): Path<i32>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<ScheduleResponse> {
    let slots = state
        .availability
        .list_slots(VenueId(venue_id), query.date)
        .await?;

    Ok(Json(ApiResponse::success(ScheduleResponse {
        venue_id,
        date: query.date,
        slots: slots.iter().map(SlotDto::from).collect(),
    })))
}
