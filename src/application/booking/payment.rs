//! Payment initiation

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::booking::{BookingId, BookingStatus};
use crate::domain::payment::{PaymentHandle, PaymentProvider, PaymentSessionRequest};
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::errors::DomainError;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

/// Requests a payment redirect target for a pending booking.
///
/// Calling it again while the booking is still `PENDING` opens a new session
/// under a new order reference; only that reference is recorded on the
/// booking.
#[derive(Clone)]
pub struct PaymentInitiator {
    repos: Arc<dyn RepositoryProvider>,
    provider: Arc<dyn PaymentProvider>,
    retry: RetryConfig,
    timeout: Duration,
    last_stamp: Arc<AtomicI64>,
}

impl PaymentInitiator {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        provider: Arc<dyn PaymentProvider>,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            repos,
            provider,
            retry,
            timeout,
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    pub async fn initiate(&self, booking_id: BookingId) -> DomainResult<PaymentHandle> {
        let booking = self.repos.bookings().get(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(DomainError::InvalidState {
                booking_id,
                status: booking.status,
            });
        }

        let venue_name = match self.repos.venues().get_venue(booking.venue_id).await {
            Ok(v) => v.name,
            Err(DomainError::NotFound { .. }) => format!("Venue {}", booking.venue_id),
            Err(e) => return Err(e),
        };
        let item_name = format!(
            "{} {}",
            venue_name,
            booking.start_time.format("%Y-%m-%d %H:%M")
        );

        let provider = &self.provider;
        let booking = &booking;
        let item_name = &item_name;
        let last_stamp = &*self.last_stamp;
        let timeout = self.timeout;
        let result = retry_with_backoff(
            self.retry.clone(),
            move || async move {
                // New order id per attempt: a timed-out attempt may still have
                // opened its session at the provider.
                let request = PaymentSessionRequest {
                    booking_id,
                    order_id: booking_id.session_order_id(next_stamp(last_stamp)),
                    amount: booking.total_price,
                    customer: booking.customer.clone(),
                    item_name: item_name.clone(),
                };
                let session = tokio::time::timeout(timeout, provider.create_payment_session(&request))
                    .await
                    .unwrap_or_else(|_| {
                        Err(DomainError::Network("payment provider timed out".into()))
                    })?;
                Ok::<_, DomainError>((request.order_id, session))
            },
            DomainError::is_transient,
            "create_payment_session",
        )
        .await;

        let (order_id, session) = match result {
            Ok(created) => created,
            Err(e) => {
                metrics::counter!("payment_sessions_total", "outcome" => "error").increment(1);
                warn!(booking_id = %booking_id, error = %e, "Payment session failed");
                return Err(e);
            }
        };

        self.repos
            .bookings()
            .record_payment_order(booking_id, &order_id)
            .await?;
        metrics::counter!("payment_sessions_total", "outcome" => "ok").increment(1);
        info!(
            booking_id = %booking_id,
            order_id = %order_id,
            provider_ref = %session.provider_ref,
            amount = booking.total_price,
            "Payment session created"
        );
        Ok(PaymentHandle {
            booking_id,
            redirect_url: session.redirect_url,
            provider_ref: session.provider_ref,
            amount: booking.total_price,
        })
    }
}

/// Milliseconds since the epoch, strictly increasing within the process.
fn next_stamp(last: &AtomicI64) -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = last
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(now.max(prev + 1)))
        .unwrap_or_else(|prev| prev);
    now.max(prev + 1)
}

// ── Tests ──────────────────────────────────────────────────────
