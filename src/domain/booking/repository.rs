//! Booking repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Booking, BookingId, BookingStatus, NewBooking};
use crate::domain::venue::VenueId;
use crate::domain::DomainResult;

/// Durable record of bookings; the single source of truth for slot occupancy.
///
/// `create` and `update_status` are linearizable: no two `create` calls may
/// both succeed for the same slot, and no two `update_status` calls may both
/// succeed from the same starting status.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new `PENDING` booking.
    ///
    /// Fails with `Conflict(SlotTaken)` if the slot already holds a
    /// `PENDING` or `PAID` booking.
    async fn create(&self, booking: NewBooking) -> DomainResult<Booking>;

    /// Fetch a booking by id, `NotFound` if unknown.
    async fn get(&self, id: BookingId) -> DomainResult<Booking>;

    /// The booking currently occupying the slot, if any.
    async fn find_by_slot(
        &self,
        venue_id: VenueId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Option<Booking>>;

    /// Compare-and-swap the status of a booking.
    ///
    /// Succeeds only if the stored status equals `expected`; otherwise
    /// returns `Conflict` and leaves the record unchanged.
    async fn update_status(
        &self,
        id: BookingId,
        new_status: BookingStatus,
        expected: BookingStatus,
    ) -> DomainResult<Booking>;

    /// Remember the order reference of the latest payment session.
    async fn record_payment_order(&self, id: BookingId, order_id: &str) -> DomainResult<()>;

    /// Bookings placed with the given customer phone, newest first.
    async fn find_by_phone(&self, phone: &str) -> DomainResult<Vec<Booking>>;

    /// Paid bookings seeking an opponent that start after `now`, soonest first.
    async fn find_open_matches(&self, now: DateTime<Utc>) -> DomainResult<Vec<Booking>>;

    /// Pending bookings created before `cutoff`.
    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>>;
}
