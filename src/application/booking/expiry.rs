//! Background task that expires unpaid bookings.
//!
//! Runs in a tokio::spawn loop, checking every `check_interval` for
//! `PENDING` bookings older than the payment window and moving them to
//! `EXPIRED`, which releases their slots.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::submission::BookingSubmissionService;
use crate::domain::DomainResult;
use crate::shared::shutdown::ShutdownSignal;

/// Start the pending-booking expiry background task.
pub fn start_pending_expiry_task(
    bookings: BookingSubmissionService,
    pending_ttl: chrono::Duration,
    check_interval: Duration,
    shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            check_interval_secs = check_interval.as_secs(),
            ttl_minutes = pending_ttl.num_minutes(),
            "⏳ Pending booking expiry task started"
        );

        let mut interval = tokio::time::interval(check_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match expire_pending(&bookings, pending_ttl).await {
                        Ok(0) => {}
                        Ok(n) => info!(count = n, "Expired unpaid bookings"),
                        Err(e) => warn!(error = %e, "Pending booking expiry check error"),
                    }
                }
                _ = shutdown.wait() => {
                    info!("⏳ Pending booking expiry task shutting down");
                    break;
                }
            }
        }

        info!("⏳ Pending booking expiry task stopped");
    })
}

/// Expire every `PENDING` booking created more than `ttl` ago.
///
/// A booking settled concurrently loses nothing: its CAS fails and it is
/// skipped.
pub async fn expire_pending(
    bookings: &BookingSubmissionService,
    ttl: chrono::Duration,
) -> DomainResult<usize> {
    let cutoff = Utc::now() - ttl;
    let overdue = bookings.pending_created_before(cutoff).await?;

    let mut expired = 0;
    for booking in overdue {
        match bookings.expire(booking.id).await {
            Ok(_) => expired += 1,
            Err(e) => warn!(booking_id = %booking.id, error = %e, "Failed to expire booking"),
        }
    }
    Ok(expired)
}

// ── Tests ──────────────────────────────────────────────────────
