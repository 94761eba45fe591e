//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub venue_id: i32,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    pub customer_name: String,
    pub customer_phone: String,

    #[sea_orm(nullable)]
    pub customer_email: Option<String>,

    #[sea_orm(nullable)]
    pub team_name: Option<String>,

    pub seeking_opponent: bool,

    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    /// Whole currency units
    pub total_price: i64,

    /// PENDING, PAID, CANCELLED, EXPIRED, DENIED
    pub status: String,

    /// Provider order reference of the latest payment session
    #[sea_orm(nullable)]
    pub payment_order_id: Option<String>,

    pub created_at: DateTimeUtc,
    pub status_updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id"
    )]
    Venue,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
