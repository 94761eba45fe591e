//! WebSocket interfaces
//!
//! - `booking_status`: live booking status driven by the reconciliation poller

pub mod booking_status;

pub use booking_status::{ws_booking_status_handler, StatusMessage, WatchState};
