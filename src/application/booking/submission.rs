//! Booking submission and status transitions
//!
//! Every write to a booking goes through this service: creation, customer
//! cancellation, payment confirmation and expiry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::booking::{Booking, BookingId, BookingStatus, Customer, NewBooking};
use crate::domain::identity::RequestContext;
use crate::domain::slot::SlotGrid;
use crate::domain::venue::VenueId;
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::errors::DomainError;

/// A slot selection with contact details
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub venue_id: VenueId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer: Customer,
}

/// Service for creating bookings and moving them through their lifecycle
#[derive(Clone)]
pub struct BookingSubmissionService {
    repos: Arc<dyn RepositoryProvider>,
    grid: Arc<SlotGrid>,
}

impl BookingSubmissionService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, grid: Arc<SlotGrid>) -> Self {
        Self { repos, grid }
    }

    /// Create a `PENDING` booking, or return the one named by
    /// `ctx.resume_booking_id`.
    ///
    /// The resume path does not look at slot occupancy again: the booking
    /// record is the authority once it exists.
    pub async fn submit(&self, ctx: &RequestContext, request: BookingRequest) -> DomainResult<Booking> {
        if let Some(id) = ctx.resume_booking_id {
            let existing = self.repos.bookings().get(id).await?;
            info!(booking_id = %id, actor = %ctx.actor.id, "Resumed existing booking");
            return Ok(existing);
        }

        let venue = self.repos.venues().get_venue(request.venue_id).await?;
        request.customer.validate()?;
        let slot = self
            .grid
            .locate(venue.id, request.start_time, request.end_time)?;
        let total_price = venue.price_for(slot.end_at - slot.start_at)?;

        let new_booking = NewBooking {
            venue_id: venue.id,
            start_time: slot.start_at,
            end_time: slot.end_at,
            customer: request.customer,
            user_id: Some(ctx.actor.id.clone()),
            total_price,
        };

        match self.repos.bookings().create(new_booking).await {
            Ok(booking) => {
                metrics::counter!("bookings_created_total").increment(1);
                info!(
                    booking_id = %booking.id,
                    venue_id = %booking.venue_id,
                    slot = %slot.label(),
                    total_price = booking.total_price,
                    "Booking created"
                );
                Ok(booking)
            }
            Err(e) => {
                if e.is_slot_taken() {
                    metrics::counter!("booking_conflicts_total").increment(1);
                    warn!(venue_id = %venue.id, slot = %slot.label(), "Slot already taken");
                }
                Err(e)
            }
        }
    }

    pub async fn get(&self, id: BookingId) -> DomainResult<Booking> {
        self.repos.bookings().get(id).await
    }

    pub async fn find_by_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        if phone.trim().is_empty() {
            return Err(DomainError::Validation("phone is required".into()));
        }
        self.repos.bookings().find_by_phone(phone).await
    }

    pub async fn open_matches(&self, now: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_open_matches(now).await
    }

    pub async fn pending_created_before(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_pending_created_before(cutoff).await
    }

    /// Compare-and-swap a booking's status.
    pub async fn apply_status(
        &self,
        id: BookingId,
        new_status: BookingStatus,
        expected: BookingStatus,
    ) -> DomainResult<Booking> {
        let booking = self
            .repos
            .bookings()
            .update_status(id, new_status, expected)
            .await?;
        metrics::counter!("booking_status_transitions_total", "status" => new_status.as_str())
            .increment(1);
        info!(booking_id = %id, from = %expected, to = %new_status, "Booking status changed");
        Ok(booking)
    }

    /// Customer cancellation of a booking that has not been paid.
    ///
    /// A settled booking is reported as `Conflict(AlreadySettled)`.
    pub async fn cancel(&self, ctx: &RequestContext, id: BookingId) -> DomainResult<Booking> {
        let booking = self.repos.bookings().get(id).await?;
        info!(booking_id = %id, actor = %ctx.actor.id, status = %booking.status, "Cancelling booking");
        self.apply_status(id, BookingStatus::Cancelled, booking.status)
            .await
    }

    /// Expire a `PENDING` booking whose payment window has elapsed.
    pub async fn expire(&self, id: BookingId) -> DomainResult<Booking> {
        self.apply_status(id, BookingStatus::Expired, BookingStatus::Pending)
            .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
