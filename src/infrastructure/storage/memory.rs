//! In-memory repository provider for development and testing

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::booking::{Booking, BookingId, BookingRepository, BookingStatus, NewBooking, SlotKey};
use crate::domain::venue::{Venue, VenueCatalog, VenueId};
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::errors::{ConflictKind, DomainError};

/// In-memory booking store
///
/// `active_slots` maps a slot to the booking that last claimed it. Writers on
/// the same slot serialise on that entry; status writers serialise on the
/// booking entry. A slot lock may be held while a booking entry is touched,
/// never the other way round.
pub struct InMemoryBookingRepository {
    bookings: DashMap<BookingId, Booking>,
    active_slots: DashMap<SlotKey, BookingId>,
    counter: AtomicI32,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            active_slots: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }

    fn next_id(&self) -> BookingId {
        BookingId(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    fn holds_slot(&self, id: &BookingId) -> bool {
        self.bookings
            .get(id)
            .map(|b| b.occupies_slot())
            .unwrap_or(false)
    }

    fn collect(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create(&self, booking: NewBooking) -> DomainResult<Booking> {
        let now = Utc::now();
        match self.active_slots.entry(booking.slot_key()) {
            Entry::Occupied(mut slot) => {
                if self.holds_slot(slot.get()) {
                    return Err(DomainError::Conflict(ConflictKind::SlotTaken));
                }
                let record = booking.into_booking(self.next_id(), now);
                self.bookings.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
            Entry::Vacant(slot) => {
                let record = booking.into_booking(self.next_id(), now);
                self.bookings.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn get(&self, id: BookingId) -> DomainResult<Booking> {
        self.bookings
            .get(&id)
            .map(|b| b.clone())
            .ok_or_else(|| DomainError::booking_not_found(id))
    }

    async fn find_by_slot(
        &self,
        venue_id: VenueId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Option<Booking>> {
        let key = SlotKey {
            venue_id,
            start_time: start,
            end_time: end,
        };
        let holder = match self.active_slots.get(&key) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self
            .bookings
            .get(&holder)
            .filter(|b| b.occupies_slot())
            .map(|b| b.clone()))
    }

    async fn update_status(
        &self,
        id: BookingId,
        new_status: BookingStatus,
        expected: BookingStatus,
    ) -> DomainResult<Booking> {
        BookingStatus::check_transition(expected, new_status)?;

        let updated = {
            let mut entry = self
                .bookings
                .get_mut(&id)
                .ok_or_else(|| DomainError::booking_not_found(id))?;
            if entry.status != expected {
                return Err(DomainError::Conflict(ConflictKind::StatusChanged {
                    expected,
                    actual: entry.status,
                }));
            }
            entry.status = new_status;
            entry.status_updated_at = Utc::now();
            entry.clone()
        };

        if !new_status.occupies_slot() {
            self.active_slots
                .remove_if(&updated.slot_key(), |_, holder| *holder == id);
        }
        Ok(updated)
    }

    async fn record_payment_order(&self, id: BookingId, order_id: &str) -> DomainResult<()> {
        let mut entry = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| DomainError::booking_not_found(id))?;
        entry.payment_order_id = Some(order_id.to_string());
        Ok(())
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let phone = phone.trim();
        let mut found = self.collect(|b| b.customer.phone == phone);
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn find_open_matches(&self, now: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let mut found = self.collect(|b| {
            b.status == BookingStatus::Paid && b.customer.seeking_opponent && b.start_time > now
        });
        found.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        let mut found = self.collect(|b| b.status == BookingStatus::Pending && b.created_at < cutoff);
        found.sort_by_key(|b| b.id);
        Ok(found)
    }
}

/// In-memory venue catalog
#[derive(Default)]
pub struct InMemoryVenueCatalog {
    venues: DashMap<VenueId, Venue>,
}

impl InMemoryVenueCatalog {
    pub fn insert(&self, venue: Venue) {
        self.venues.insert(venue.id, venue);
    }
}

#[async_trait]
impl VenueCatalog for InMemoryVenueCatalog {
    async fn get_venue(&self, id: VenueId) -> DomainResult<Venue> {
        self.venues
            .get(&id)
            .map(|v| v.clone())
            .ok_or_else(|| DomainError::venue_not_found(id))
    }

    async fn list_venues(&self) -> DomainResult<Vec<Venue>> {
        let mut venues: Vec<Venue> = self.venues.iter().map(|e| e.value().clone()).collect();
        venues.sort_by_key(|v| v.id);
        Ok(venues)
    }
}

/// In-memory implementation of `RepositoryProvider`
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    bookings: InMemoryBookingRepository,
    venues: InMemoryVenueCatalog,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_venues(venues: impl IntoIterator<Item = Venue>) -> Self {
        let provider = Self::new();
        for venue in venues {
            provider.venues.insert(venue);
        }
        provider
    }

    pub fn add_venue(&self, venue: Venue) {
        self.venues.insert(venue);
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn venues(&self) -> &dyn VenueCatalog {
        &self.venues
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::booking::Customer;

    fn new_booking(hour: u32, phone: &str) -> NewBooking {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap();
        NewBooking {
            venue_id: VenueId(1),
            start_time: start,
            end_time: start + Duration::hours(1),
            customer: Customer::new("Budi", phone),
            user_id: None,
            total_price: 100,
        }
    }

    #[tokio::test]
    async fn second_create_for_same_slot_conflicts() {
        let repo = InMemoryBookingRepository::new();
        let first = repo.create(new_booking(2, "0811")).await.unwrap();
        assert_eq!(first.status, BookingStatus::Pending);

        let err = repo.create(new_booking(2, "0822")).await.unwrap_err();
        assert!(err.is_slot_taken());
    }

    #[tokio::test]
    async fn concurrent_creates_yield_exactly_one_booking() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(new_booking(3, &format!("08{}", i))).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) if e.is_slot_taken() => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
    }

    #[tokio::test]
    async fn released_slot_can_be_booked_again() {
        let repo = InMemoryBookingRepository::new();
        let first = repo.create(new_booking(4, "0811")).await.unwrap();
        repo.update_status(first.id, BookingStatus::Cancelled, BookingStatus::Pending)
            .await
            .unwrap();

        let slot = first.slot_key();
        assert!(repo
            .find_by_slot(slot.venue_id, slot.start_time, slot.end_time)
            .await
            .unwrap()
            .is_none());

        let second = repo.create(new_booking(4, "0822")).await.unwrap();
        assert_ne!(second.id, first.id);
        let holder = repo
            .find_by_slot(slot.venue_id, slot.start_time, slot.end_time)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holder.id, second.id);
    }

    #[tokio::test]
    async fn latest_payment_order_is_kept() {
        let repo = InMemoryBookingRepository::new();
        let b = repo.create(new_booking(6, "0811")).await.unwrap();
        assert_eq!(b.order_id(), b.id.order_id());

        repo.record_payment_order(b.id, "booking-1-100").await.unwrap();
        repo.record_payment_order(b.id, "booking-1-200").await.unwrap();
        assert_eq!(repo.get(b.id).await.unwrap().order_id(), "booking-1-200");

        let err = repo.record_payment_order(BookingId(99), "booking-99-1").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_status_is_compare_and_swap() {
        let repo = InMemoryBookingRepository::new();
        let b = repo.create(new_booking(5, "0811")).await.unwrap();

        let paid = repo
            .update_status(b.id, BookingStatus::Paid, BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(paid.status, BookingStatus::Paid);

        let err = repo
            .update_status(b.id, BookingStatus::Cancelled, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::StatusChanged {
                actual: BookingStatus::Paid,
                ..
            })
        ));

        let err = repo
            .update_status(b.id, BookingStatus::Cancelled, BookingStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ConflictKind::AlreadySettled(_))));
        assert_eq!(repo.get(b.id).await.unwrap().status, BookingStatus::Paid);
    }

    #[tokio::test]
    async fn racing_transitions_from_pending_have_one_winner() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let b = repo.create(new_booking(6, "0811")).await.unwrap();

        let targets = [BookingStatus::Paid, BookingStatus::Cancelled, BookingStatus::Expired];
        let handles: Vec<_> = targets
            .into_iter()
            .map(|s| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.update_status(b.id, s, BookingStatus::Pending).await })
            })
            .collect();

        let mut winners = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let repo = InMemoryBookingRepository::new();
        assert!(matches!(
            repo.get(BookingId(99)).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            repo.update_status(BookingId(99), BookingStatus::Paid, BookingStatus::Pending)
                .await
                .unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn lookups_filter_and_order() {
        let repo = InMemoryBookingRepository::new();
        let a = repo.create(new_booking(7, "0811")).await.unwrap();
        let b = repo.create(new_booking(8, "0811")).await.unwrap();
        repo.create(new_booking(9, "0899")).await.unwrap();

        let mine = repo.find_by_phone(" 0811 ").await.unwrap();
        assert_eq!(mine.iter().map(|x| x.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let cutoff = Utc::now() + Duration::seconds(1);
        assert_eq!(repo.find_pending_created_before(cutoff).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn open_matches_are_paid_future_and_seeking() {
        let repo = InMemoryBookingRepository::new();
        let mut seeking = new_booking(10, "0811");
        seeking.customer.seeking_opponent = true;
        let seeking = repo.create(seeking).await.unwrap();
        let mut unpaid = new_booking(11, "0822");
        unpaid.customer.seeking_opponent = true;
        repo.create(unpaid).await.unwrap();

        repo.update_status(seeking.id, BookingStatus::Paid, BookingStatus::Pending)
            .await
            .unwrap();

        let before = seeking.start_time - Duration::hours(1);
        let open = repo.find_open_matches(before).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, seeking.id);
        assert!(repo.find_open_matches(seeking.start_time).await.unwrap().is_empty());
    }
}
