//! Booking status stream
//!
//! `GET /api/v1/bookings/{id}/watch` upgrades to a WebSocket that runs a
//! [`StatusReconciliationPoller`] for one booking. Every poller state is sent
//! as a JSON text frame; the socket is closed once the booking settles.
//! Closing the socket from the client side drops the poller, which stops its
//! recurring task.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::select;
use tracing::{debug, info, warn};

use crate::application::booking::{
    PaymentReconciler, PollerConfig, PollerState, StatusReconciliationPoller,
};
use crate::domain::booking::BookingId;

#[derive(Clone)]
pub struct WatchState {
    pub reconciler: PaymentReconciler,
    pub poller: PollerConfig,
}

/// One frame sent to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusMessage {
    State {
        /// `idle`, `watching` or `settled`
        state: &'static str,
        booking_id: Option<i32>,
        status: Option<&'static str>,
    },
    Error {
        message: String,
    },
}

impl From<PollerState> for StatusMessage {
    fn from(s: PollerState) -> Self {
        let state = match s {
            PollerState::Idle => "idle",
            PollerState::Watching(_) => "watching",
            PollerState::Settled(..) => "settled",
        };
        Self::State {
            state,
            booking_id: s.booking_id().map(|id| id.0),
            status: s.status().map(|st| st.as_str()),
        }
    }
}

pub async fn ws_booking_status_handler(
    ws: WebSocketUpgrade,
    State(state): State<WatchState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    info!(booking_id = id, "Booking status stream requested");
    ws.on_upgrade(move |socket| watch_booking_status(socket, state, BookingId(id)))
}

async fn send_json(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &StatusMessage,
) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize status message: {}", e);
            return false;
        }
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}

async fn watch_booking_status(socket: WebSocket, state: WatchState, id: BookingId) {
    let (mut sender, mut receiver) = socket.split();

    let poller = StatusReconciliationPoller::new(Arc::new(state.reconciler), state.poller);
    let mut updates = poller.subscribe();

    if let Err(e) = poller.start(id).await {
        debug!(booking_id = %id, error = %e, "Initial status check failed");
        let _ = send_json(&mut sender, &StatusMessage::Error { message: e.to_string() }).await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    loop {
        let current = *updates.borrow_and_update();
        if !send_json(&mut sender, &current.into()).await {
            break;
        }
        if matches!(current, PollerState::Settled(..)) {
            let _ = sender
                .send(Message::Close(Some(CloseFrame {
                    code: axum::extract::ws::close_code::NORMAL,
                    reason: "settled".into(),
                })))
                .await;
            break;
        }

        let keep_going = loop {
            select! {
                changed = updates.changed() => break changed.is_ok(),
                msg = receiver.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(booking_id = %id, "Client closed status stream");
                        break false;
                    }
                    Some(Err(e)) => {
                        warn!(booking_id = %id, "WebSocket error: {}", e);
                        break false;
                    }
                    // Pings are answered by the socket; other frames are ignored.
                    Some(Ok(_)) => continue,
                },
            }
        };
        if !keep_going {
            break;
        }
    }

    poller.cancel();
    info!(booking_id = %id, "Booking status stream closed");
}

// ── Tests ──────────────────────────────────────────────────────
