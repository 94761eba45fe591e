//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::venue::VenueCatalog;

use super::booking_repository::SeaOrmBookingRepository;
use super::venue_repository::SeaOrmVenueRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let booking = repos.bookings().get(BookingId(7)).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    bookings: SeaOrmBookingRepository,
    venues: SeaOrmVenueRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            bookings: SeaOrmBookingRepository::new(db.clone()),
            venues: SeaOrmVenueRepository::new(db),
        }
    }

    /// Concrete venue repository, for seeding.
    pub fn venue_store(&self) -> &SeaOrmVenueRepository {
        &self.venues
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn venues(&self) -> &dyn VenueCatalog {
        &self.venues
    }
}
