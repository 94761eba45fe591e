//! Venue catalog types
//!
//! Venues are an external collaborator's data; CRUD lives outside this crate.

pub mod catalog;
pub mod model;

pub use catalog::VenueCatalog;
pub use model::{join_facilities, parse_facilities, NewVenue, SportType, Venue, VenueId};
