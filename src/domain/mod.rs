//! Domain layer: entities, value types and ports
//!
//! Nothing here performs I/O. Storage and the payment gateway are reached
//! through the traits re-exported below.

pub mod booking;
pub mod identity;
pub mod payment;
pub mod repositories;
pub mod slot;
pub mod venue;

// Re-export commonly used types
pub use booking::{Booking, BookingId, BookingRepository, BookingStatus, Customer, NewBooking, SlotKey};
pub use identity::{Actor, RequestContext, Role};
pub use payment::{PaymentHandle, PaymentProvider, PaymentSession, PaymentSessionRequest, ProviderPaymentStatus};
pub use repositories::{DomainResult, RepositoryProvider};
pub use slot::{SlotGrid, SlotStatus, TimeSlot};
pub use venue::{SportType, Venue, VenueCatalog, VenueId};

pub use crate::shared::errors::DomainError;
