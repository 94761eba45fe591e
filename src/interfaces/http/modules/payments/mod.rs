//! Payment initiation and provider notifications

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
