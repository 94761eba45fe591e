use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::booking::SlotAvailability;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    /// Local calendar date, `YYYY-MM-DD`
    #[param(value_type = String, example = "2026-03-14")]
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    /// `"09:00 - 10:00"` in venue-local time
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `available`, `booked` or `closed`
    pub status: String,
}

impl From<&SlotAvailability> for SlotDto {
    fn from(s: &SlotAvailability) -> Self {
        Self {
            label: s.slot.label(),
            start_time: s.slot.start_at,
            end_time: s.slot.end_at,
            status: s.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub venue_id: i32,
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub slots: Vec<SlotDto>,
}
