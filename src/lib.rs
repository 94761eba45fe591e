//! # Venue Booking
//!
//! Booking and payment reconciliation core for a sports-venue storefront:
//! slot availability, reservation submission with double-booking
//! prevention, payment initiation, and status reconciliation with the
//! payment provider.
//!
//! ## Architecture
//!
//! - **domain**: Entities (bookings, venues, slot grid, identity) and ports
//! - **application**: Booking use cases, the status poller and the expiry task
//! - **infrastructure**: SeaORM/SQLite storage, in-memory storage, payment
//!   gateway client, JWT
//! - **interfaces**: REST API with Swagger documentation, WebSocket status stream
//! - **shared**: Error taxonomy, retry, graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{connect_and_migrate, init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::{create_api_router, ApiState};

pub use shared::errors::{DomainError, InfraError};
