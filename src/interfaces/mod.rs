//! Client-facing interfaces
//!
//! - `http`: REST API (axum) with Swagger documentation
//! - `ws`: booking status streaming over WebSocket

pub mod http;
pub mod ws;

pub use http::{create_api_router, ApiState};
