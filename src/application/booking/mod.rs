//! Booking & payment reconciliation use cases

pub mod availability;
pub mod expiry;
pub mod payment;
pub mod poller;
pub mod reconciliation;
pub mod submission;

pub use availability::{SlotAvailability, SlotAvailabilityResolver};
pub use expiry::start_pending_expiry_task;
pub use payment::PaymentInitiator;
pub use poller::{BookingStatusSource, PollerConfig, PollerState, StatusReconciliationPoller};
pub use reconciliation::{PaymentNotification, PaymentReconciler};
pub use submission::{BookingRequest, BookingSubmissionService};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{FixedOffset, NaiveTime, TimeZone, Utc};
    use dashmap::DashMap;

    use super::BookingRequest;
    use crate::domain::booking::{BookingId, BookingStatus, Customer};
    use crate::domain::identity::{Actor, RequestContext, Role};
    use crate::domain::payment::{PaymentProvider, PaymentSession, PaymentSessionRequest};
    use crate::domain::slot::SlotGrid;
    use crate::domain::venue::{SportType, Venue, VenueId};
    use crate::domain::DomainResult;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::errors::DomainError;

    pub fn venue() -> Venue {
        Venue {
            id: VenueId(1),
            name: "Lapangan Futsal A".into(),
            sport: SportType::Futsal,
            location: "Medan".into(),
            price_per_hour: 100,
            facilities: BTreeSet::new(),
            image_url: None,
        }
    }

    pub fn grid() -> SlotGrid {
        let midday = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        SlotGrid::new(8, 22, 60, [midday], 420).unwrap()
    }

    pub fn setup() -> (Arc<InMemoryRepositoryProvider>, Arc<SlotGrid>) {
        (
            Arc::new(InMemoryRepositoryProvider::with_venues([venue()])),
            Arc::new(grid()),
        )
    }

    pub fn context() -> RequestContext {
        RequestContext::new(Actor::new("u-1", Role::Customer))
    }

    /// One-hour request at the given local hour on 2026-03-14 (UTC+7).
    pub fn request_at(hour: u32, phone: &str) -> BookingRequest {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let start = offset
            .with_ymd_and_hms(2026, 3, 14, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        BookingRequest {
            venue_id: VenueId(1),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            customer: Customer::new("Budi", phone),
        }
    }

    /// Scriptable payment provider
    #[derive(Default)]
    pub struct FakeProvider {
        statuses: DashMap<BookingId, BookingStatus>,
        failing_status_calls: AtomicU32,
        failing_sessions: AtomicU32,
        status_calls: AtomicU32,
        session_calls: AtomicU32,
    }

    impl FakeProvider {
        pub fn set_status(&self, id: BookingId, status: BookingStatus) {
            self.statuses.insert(id, status);
        }

        pub fn fail_next_status_calls(&self, n: u32) {
            self.failing_status_calls.store(n, Ordering::SeqCst);
        }

        pub fn fail_next_sessions(&self, n: u32) {
            self.failing_sessions.store(n, Ordering::SeqCst);
        }

        pub fn status_calls(&self) -> u32 {
            self.status_calls.load(Ordering::SeqCst)
        }

        pub fn session_calls(&self) -> u32 {
            self.session_calls.load(Ordering::SeqCst)
        }

        fn take_failure(counter: &AtomicU32) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn create_payment_session(
            &self,
            request: &PaymentSessionRequest,
        ) -> DomainResult<PaymentSession> {
            let n = self.session_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if Self::take_failure(&self.failing_sessions) {
                return Err(DomainError::Upstream("provider unavailable".into()));
            }
            Ok(PaymentSession {
                redirect_url: format!("https://pay.test/{}/{}", request.order_id, n),
                provider_ref: format!("ref-{}-{}", request.booking_id, n),
            })
        }

        async fn get_payment_status(&self, order_id: &str) -> DomainResult<BookingStatus> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let booking_id = BookingId::from_order_id(order_id)?;
            if Self::take_failure(&self.failing_status_calls) {
                return Err(DomainError::Network("provider timeout".into()));
            }
            Ok(self
                .statuses
                .get(&booking_id)
                .map(|s| *s)
                .unwrap_or(BookingStatus::Pending))
        }
    }
}
