//! SeaORM implementation of VenueCatalog

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryOrder, Set};

use crate::domain::venue::{
    join_facilities, parse_facilities, NewVenue, SportType, Venue, VenueCatalog, VenueId,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::venue;
use crate::shared::errors::InfraError;

pub struct SeaOrmVenueRepository {
    db: DatabaseConnection,
}

impl SeaOrmVenueRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn count(&self) -> DomainResult<u64> {
        venue::Entity::find().count(&self.db).await.map_err(db_err)
    }

    pub async fn create(&self, v: NewVenue) -> DomainResult<Venue> {
        debug!("Creating venue: {}", v.name);

        let model = venue::ActiveModel {
            id: NotSet,
            name: Set(v.name.clone()),
            sport_type: Set(v.sport.as_str().to_string()),
            location: Set(v.location.clone()),
            price_per_hour: Set(v.price_per_hour),
            facilities: Set(join_facilities(&v.facilities)),
            image_url: Set(v.image_url.clone()),
            created_at: Set(Utc::now()),
        };
        let inserted = model.insert(&self.db).await.map_err(db_err)?;
        Ok(v.into_venue(VenueId(inserted.id)))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: venue::Model) -> Venue {
    Venue {
        id: VenueId(m.id),
        name: m.name,
        sport: SportType::parse(&m.sport_type),
        location: m.location,
        price_per_hour: m.price_per_hour,
        facilities: parse_facilities(&m.facilities),
        image_url: m.image_url,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

// ── VenueCatalog impl ───────────────────────────────────────────

#[async_trait]
impl VenueCatalog for SeaOrmVenueRepository {
    async fn get_venue(&self, id: VenueId) -> DomainResult<Venue> {
        venue::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .ok_or_else(|| DomainError::venue_not_found(id))
    }

    async fn list_venues(&self) -> DomainResult<Vec<Venue>> {
        let models = venue::Entity::find()
            .order_by_asc(venue::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
