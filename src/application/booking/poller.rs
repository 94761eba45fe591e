//! Status reconciliation poller
//!
//! Tracks one booking until it reaches a terminal status.
//!
//! ```text
//! Idle ──start(id)──► Watching(id) ──tick: terminal──► Settled(id, status)
//!   ▲        │                                               │
//!   │        └──── first fetch already terminal ─────────────┘
//!   └──────────────────────── cancel() ──────────────────────┘
//! ```
//!
//! The recurring task is bound to a `CancellationToken` whose `DropGuard` is
//! owned by the poller, so the task stops on `cancel()`, on restart and when
//! the poller is dropped. Every publish is fenced by an epoch counter: once
//! `cancel()` has returned, no further state change from the old task can be
//! observed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::domain::booking::{BookingId, BookingStatus};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Where the poller reads a booking's status from.
#[async_trait]
pub trait BookingStatusSource: Send + Sync {
    async fn fetch_status(&self, id: BookingId) -> DomainResult<BookingStatus>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Watching(BookingId),
    Settled(BookingId, BookingStatus),
}

impl PollerState {
    pub fn booking_id(&self) -> Option<BookingId> {
        match self {
            Self::Idle => None,
            Self::Watching(id) | Self::Settled(id, _) => Some(*id),
        }
    }

    /// Status as a client would display it.
    pub fn status(&self) -> Option<BookingStatus> {
        match self {
            Self::Idle => None,
            Self::Watching(_) => Some(BookingStatus::Pending),
            Self::Settled(_, status) => Some(*status),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between recurring checks
    pub interval: Duration,
    /// Upper bound on a single status fetch
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

pub struct StatusReconciliationPoller {
    source: Arc<dyn BookingStatusSource>,
    config: PollerConfig,
    state: Arc<watch::Sender<PollerState>>,
    epoch: Arc<AtomicU64>,
    task: Mutex<Option<DropGuard>>,
}

impl StatusReconciliationPoller {
    pub fn new(source: Arc<dyn BookingStatusSource>, config: PollerConfig) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            source,
            config,
            state: Arc::new(state),
            epoch: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    /// Begin tracking `id`, replacing whatever was tracked before.
    ///
    /// The first fetch runs before this returns. Its failure is returned to
    /// the caller and leaves the poller `Idle`.
    pub async fn start(&self, id: BookingId) -> DomainResult<PollerState> {
        self.cancel();
        let epoch = self.epoch.load(Ordering::SeqCst);

        let status = fetch(&*self.source, id, self.config.fetch_timeout).await?;

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if self.epoch.load(Ordering::SeqCst) != epoch {
            // Cancelled or restarted while the first fetch was in flight.
            return Ok(self.state());
        }

        if status.is_terminal() {
            let settled = PollerState::Settled(id, status);
            self.state.send_replace(settled);
            info!(booking_id = %id, status = %status, "Booking already settled");
            return Ok(settled);
        }

        let token = CancellationToken::new();
        self.state.send_replace(PollerState::Watching(id));
        tokio::spawn(watch_booking(
            self.source.clone(),
            id,
            self.config.clone(),
            self.state.clone(),
            self.epoch.clone(),
            epoch,
            token.clone(),
        ));
        *task = Some(token.drop_guard());
        debug!(booking_id = %id, "Watching booking status");
        Ok(PollerState::Watching(id))
    }

    /// Stop tracking and return to `Idle`. Idempotent.
    pub fn cancel(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        self.epoch.fetch_add(1, Ordering::SeqCst);
        // Dropping the guard cancels the token.
        task.take();
        self.state.send_if_modified(|s| {
            let changed = *s != PollerState::Idle;
            *s = PollerState::Idle;
            changed
        });
    }
}

impl Drop for StatusReconciliationPoller {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

async fn fetch(
    source: &dyn BookingStatusSource,
    id: BookingId,
    timeout: Duration,
) -> DomainResult<BookingStatus> {
    tokio::time::timeout(timeout, source.fetch_status(id))
        .await
        .unwrap_or_else(|_| Err(DomainError::Network("status check timed out".into())))
}

async fn watch_booking(
    source: Arc<dyn BookingStatusSource>,
    id: BookingId,
    config: PollerConfig,
    state: Arc<watch::Sender<PollerState>>,
    epoch: Arc<AtomicU64>,
    started_at_epoch: u64,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
    // A check still running when the next tick is due makes that tick drop.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            r = fetch(&*source, id, config.fetch_timeout) => r,
        };

        match result {
            Ok(status) if status.is_terminal() => {
                metrics::counter!("poller_checks_total", "outcome" => "settled").increment(1);
                let published = state.send_if_modified(|s| {
                    if epoch.load(Ordering::SeqCst) != started_at_epoch {
                        return false;
                    }
                    *s = PollerState::Settled(id, status);
                    true
                });
                if published {
                    info!(booking_id = %id, status = %status, "Booking settled");
                }
                break;
            }
            Ok(_) => {
                metrics::counter!("poller_checks_total", "outcome" => "pending").increment(1);
            }
            Err(e) => {
                metrics::counter!("poller_checks_total", "outcome" => "error").increment(1);
                if e.is_transient() {
                    debug!(booking_id = %id, error = %e, "Status check failed, retrying next tick");
                } else {
                    warn!(booking_id = %id, error = %e, "Status check failed");
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
