//! Reconciling local booking status with the payment provider
//!
//! Two inputs feed the same compare-and-swap path: explicit status checks
//! (driven by the poller) and provider notifications (webhook). A CAS
//! conflict here only means another path settled the booking first, so it
//! is resolved by re-reading the record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::poller::BookingStatusSource;
use super::submission::BookingSubmissionService;
use crate::domain::booking::{Booking, BookingId, BookingStatus};
use crate::domain::payment::{PaymentProvider, ProviderPaymentStatus};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// A provider status callback, already authenticated.
#[derive(Debug, Clone)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status: ProviderPaymentStatus,
}

impl PaymentNotification {
    pub fn booking_id(&self) -> DomainResult<BookingId> {
        BookingId::from_order_id(&self.order_id)
    }
}

#[derive(Clone)]
pub struct PaymentReconciler {
    bookings: BookingSubmissionService,
    provider: Arc<dyn PaymentProvider>,
}

impl PaymentReconciler {
    pub fn new(bookings: BookingSubmissionService, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { bookings, provider }
    }

    /// Current status of a booking, settling it first if the provider
    /// reports a terminal payment state.
    pub async fn reconcile(&self, id: BookingId) -> DomainResult<BookingStatus> {
        let booking = self.bookings.get(id).await?;
        if booking.is_settled() {
            return Ok(booking.status);
        }

        let reported = self.provider.get_payment_status(&booking.order_id()).await?;
        if !reported.is_terminal() {
            debug!(booking_id = %id, "Payment still pending");
            return Ok(BookingStatus::Pending);
        }
        Ok(self.settle(id, reported).await?.status)
    }

    /// Apply a provider notification to its booking.
    pub async fn apply_notification(
        &self,
        notification: &PaymentNotification,
    ) -> DomainResult<Booking> {
        let id = notification.booking_id()?;
        let reported = notification.status.to_booking_status()?;
        info!(
            booking_id = %id,
            transaction_status = %notification.status.transaction_status,
            mapped = %reported,
            "Payment notification received"
        );
        if !reported.is_terminal() {
            return self.bookings.get(id).await;
        }
        self.settle(id, reported).await
    }

    async fn settle(&self, id: BookingId, status: BookingStatus) -> DomainResult<Booking> {
        match self
            .bookings
            .apply_status(id, status, BookingStatus::Pending)
            .await
        {
            Ok(booking) => Ok(booking),
            Err(DomainError::Conflict(kind)) => {
                debug!(booking_id = %id, conflict = %kind, "Booking already settled, refetching");
                self.bookings.get(id).await
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl BookingStatusSource for PaymentReconciler {
    async fn fetch_status(&self, id: BookingId) -> DomainResult<BookingStatus> {
        self.reconcile(id).await
    }
}

// ── Tests ──────────────────────────────────────────────────────
