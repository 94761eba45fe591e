//! Liveness with a storage probe

pub mod handlers;

pub use handlers::*;
