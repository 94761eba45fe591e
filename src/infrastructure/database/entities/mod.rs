//! Database entities module

pub mod booking;
pub mod venue;

pub use booking::Entity as Booking;
pub use venue::Entity as Venue;
