//! Venue catalog interface

use async_trait::async_trait;

use super::model::{Venue, VenueId};
use crate::domain::DomainResult;

/// Read access to the external venue catalog.
#[async_trait]
pub trait VenueCatalog: Send + Sync {
    /// Fetch a venue, `NotFound` if the catalog does not know it.
    async fn get_venue(&self, id: VenueId) -> DomainResult<Venue>;

    /// All venues, ordered by id.
    async fn list_venues(&self) -> DomainResult<Vec<Venue>>;
}
