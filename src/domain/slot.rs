//! Fixed daily slot grid
//!
//! Slots are never persisted. They are derived from the grid (e.g. 08:00–22:00
//! in one-hour steps, in the venue's local offset) and intersected with the
//! booking store when availability is resolved.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::domain::venue::VenueId;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Display status of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Available,
    Booked,
    Closed,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Closed => "closed",
        }
    }
}

/// One grid cell at a venue, identified by `(venue_id, date, start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub venue_id: VenueId,
    /// Local calendar date
    pub date: NaiveDate,
    /// Local start time
    pub start: NaiveTime,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl TimeSlot {
    /// Local end time
    pub fn end(&self) -> NaiveTime {
        self.start + (self.end_at - self.start_at)
    }

    /// `"09:00 - 10:00"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end().format("%H:%M"))
    }
}

/// The fixed daily grid shared by all venues.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    opening: NaiveTime,
    closing: NaiveTime,
    slot_minutes: u32,
    closed: BTreeSet<NaiveTime>,
    offset: FixedOffset,
}

impl SlotGrid {
    pub fn new(
        opening_hour: u32,
        closing_hour: u32,
        slot_minutes: u32,
        closed: impl IntoIterator<Item = NaiveTime>,
        utc_offset_minutes: i32,
    ) -> DomainResult<Self> {
        let invalid = |msg: &str| DomainError::Validation(format!("Invalid slot grid: {}", msg));

        let opening = NaiveTime::from_hms_opt(opening_hour, 0, 0)
            .ok_or_else(|| invalid("opening hour out of range"))?;
        let closing = NaiveTime::from_hms_opt(closing_hour, 0, 0)
            .ok_or_else(|| invalid("closing hour must be before midnight"))?;
        if closing <= opening {
            return Err(invalid("closing hour must be after opening hour"));
        }
        if slot_minutes == 0 {
            return Err(invalid("slot width must be positive"));
        }
        let window = (closing - opening).num_minutes();
        if window % i64::from(slot_minutes) != 0 {
            return Err(invalid("slot width must divide the opening window"));
        }
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or_else(|| invalid("UTC offset out of range"))?;

        Ok(Self {
            opening,
            closing,
            slot_minutes,
            closed: closed.into_iter().collect(),
            offset,
        })
    }

    pub fn slot_width(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn is_closed(&self, start: NaiveTime) -> bool {
        self.closed.contains(&start)
    }

    /// Local start times of every cell, in order.
    pub fn start_times(&self) -> Vec<NaiveTime> {
        let count = (self.closing - self.opening).num_minutes() / i64::from(self.slot_minutes);
        (0..count)
            .map(|i| self.opening + self.slot_width() * i as i32)
            .collect()
    }

    /// Every cell of `date` at the venue, ordered by start.
    pub fn slots_for(&self, venue_id: VenueId, date: NaiveDate) -> Vec<TimeSlot> {
        self.start_times()
            .into_iter()
            .filter_map(|start| self.slot_at(venue_id, date, start))
            .collect()
    }

    fn slot_at(&self, venue_id: VenueId, date: NaiveDate, start: NaiveTime) -> Option<TimeSlot> {
        let local = self.offset.from_local_datetime(&date.and_time(start)).single()?;
        let start_at = local.with_timezone(&Utc);
        Some(TimeSlot {
            venue_id,
            date,
            start,
            start_at,
            end_at: start_at + self.slot_width(),
        })
    }

    /// Resolve an interval into exactly one grid cell.
    ///
    /// Fails with `Validation` when the interval is not one cell wide, does
    /// not start on a cell boundary, falls outside opening hours, or hits a
    /// closed cell.
    pub fn locate(
        &self,
        venue_id: VenueId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<TimeSlot> {
        if end <= start {
            return Err(DomainError::Validation(
                "endTime must be after startTime".into(),
            ));
        }
        if end - start != self.slot_width() {
            return Err(DomainError::Validation(format!(
                "Booking must span exactly one {}-minute slot",
                self.slot_minutes
            )));
        }

        let local = start.with_timezone(&self.offset);
        let date = local.date_naive();
        let time = local.time();
        let on_grid = time.second() == 0
            && time.nanosecond() == 0
            && self.start_times().contains(&time);
        if !on_grid {
            return Err(DomainError::Validation(format!(
                "{} is not a slot start time",
                time.format("%H:%M:%S")
            )));
        }
        if self.is_closed(time) {
            return Err(DomainError::Validation(format!(
                "Slot {} is closed",
                time.format("%H:%M")
            )));
        }

        self.slot_at(venue_id, date, time)
            .ok_or_else(|| DomainError::Validation("Slot start is not representable".into()))
    }
}
