//! Non-durable repository implementations

mod memory;

pub use memory::{InMemoryBookingRepository, InMemoryRepositoryProvider, InMemoryVenueCatalog};
