//! Slot availability for a venue and date

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::slot::{SlotGrid, SlotStatus, TimeSlot};
use crate::domain::venue::VenueId;
use crate::domain::{DomainResult, RepositoryProvider};

/// One row of the schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub status: SlotStatus,
}

/// Computes the status of each grid slot by reading the booking store.
///
/// Pure read; results are always recomputed.
#[derive(Clone)]
pub struct SlotAvailabilityResolver {
    repos: Arc<dyn RepositoryProvider>,
    grid: Arc<SlotGrid>,
}

impl SlotAvailabilityResolver {
    pub fn new(repos: Arc<dyn RepositoryProvider>, grid: Arc<SlotGrid>) -> Self {
        Self { repos, grid }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub async fn list_slots(
        &self,
        venue_id: VenueId,
        date: NaiveDate,
    ) -> DomainResult<Vec<SlotAvailability>> {
        // Unknown venues are NotFound, not an empty schedule.
        self.repos.venues().get_venue(venue_id).await?;

        let mut schedule = Vec::new();
        for slot in self.grid.slots_for(venue_id, date) {
            let status = if self.grid.is_closed(slot.start) {
                SlotStatus::Closed
            } else {
                match self
                    .repos
                    .bookings()
                    .find_by_slot(venue_id, slot.start_at, slot.end_at)
                    .await?
                {
                    Some(b) if b.occupies_slot() => SlotStatus::Booked,
                    _ => SlotStatus::Available,
                }
            };
            schedule.push(SlotAvailability { slot, status });
        }

        debug!(
            venue_id = %venue_id,
            date = %date,
            booked = schedule.iter().filter(|s| s.status == SlotStatus::Booked).count(),
            "Resolved slot availability"
        );
        Ok(schedule)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::test_support::{context, request_at, setup};
    use crate::application::booking::BookingSubmissionService;
    use crate::domain::booking::BookingStatus;
    use crate::shared::errors::DomainError;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn status_at(schedule: &[SlotAvailability], hour: u32) -> SlotStatus {
        schedule
            .iter()
            .find(|s| s.slot.label().starts_with(&format!("{:02}:00", hour)))
            .map(|s| s.status)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_day_is_available_except_midday() {
        let (repos, grid) = setup();
        let resolver = SlotAvailabilityResolver::new(repos, grid);

        let schedule = resolver.list_slots(VenueId(1), date()).await.unwrap();
        assert_eq!(schedule.len(), 14);
        assert_eq!(status_at(&schedule, 12), SlotStatus::Closed);
        assert_eq!(
            schedule.iter().filter(|s| s.status == SlotStatus::Available).count(),
            13
        );
    }

    #[tokio::test]
    async fn booked_then_released() {
        let (repos, grid) = setup();
        let resolver = SlotAvailabilityResolver::new(repos.clone(), grid.clone());
        let service = BookingSubmissionService::new(repos, grid);

        let booking = service.submit(&context(), request_at(9, "0811")).await.unwrap();
        let schedule = resolver.list_slots(VenueId(1), date()).await.unwrap();
        assert_eq!(status_at(&schedule, 9), SlotStatus::Booked);
        assert_eq!(status_at(&schedule, 10), SlotStatus::Available);

        service
            .apply_status(booking.id, BookingStatus::Cancelled, BookingStatus::Pending)
            .await
            .unwrap();
        let schedule = resolver.list_slots(VenueId(1), date()).await.unwrap();
        assert_eq!(status_at(&schedule, 9), SlotStatus::Available);
    }

    #[tokio::test]
    async fn unknown_venue_is_not_found() {
        let (repos, grid) = setup();
        let resolver = SlotAvailabilityResolver::new(repos, grid);
        let err = resolver.list_slots(VenueId(9), date()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
