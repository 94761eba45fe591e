//! SeaORM implementation of BookingRepository
//!
//! Slot exclusivity is decided by the `idx_bookings_active_slot` partial
//! unique index: `create` is a single `INSERT`, so concurrent writers queue on
//! SQLite's busy timeout and the losers see a unique violation. Status updates
//! are a single conditional `UPDATE ... WHERE status = expected`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::domain::booking::{
    Booking, BookingId, BookingRepository, BookingStatus, Customer, NewBooking,
};
use crate::domain::venue::VenueId;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::booking;
use crate::shared::errors::{ConflictKind, InfraError};

const ACTIVE_STATUSES: [&str; 2] = ["PENDING", "PAID"];

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let status = m
        .status
        .parse::<BookingStatus>()
        .map_err(|e| DomainError::Network(format!("Corrupt booking {}: {}", m.id, e)))?;
    Ok(Booking {
        id: BookingId(m.id),
        venue_id: VenueId(m.venue_id),
        start_time: m.start_time,
        end_time: m.end_time,
        customer: Customer {
            name: m.customer_name,
            phone: m.customer_phone,
            email: m.customer_email,
            team_name: m.team_name,
            seeking_opponent: m.seeking_opponent,
        },
        user_id: m.user_id,
        total_price: m.total_price,
        status,
        payment_order_id: m.payment_order_id,
        created_at: m.created_at,
        status_updated_at: m.status_updated_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn insert_err(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(ConflictKind::SlotTaken),
        _ => db_err(e),
    }
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, b: NewBooking) -> DomainResult<Booking> {
        debug!(
            "Creating booking: venue={} start={} end={}",
            b.venue_id, b.start_time, b.end_time
        );

        let now = Utc::now();
        let model = booking::ActiveModel {
            id: NotSet,
            venue_id: Set(b.venue_id.0),
            start_time: Set(b.start_time),
            end_time: Set(b.end_time),
            customer_name: Set(b.customer.name),
            customer_phone: Set(b.customer.phone),
            customer_email: Set(b.customer.email),
            team_name: Set(b.customer.team_name),
            seeking_opponent: Set(b.customer.seeking_opponent),
            user_id: Set(b.user_id),
            total_price: Set(b.total_price),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            payment_order_id: Set(None),
            created_at: Set(now),
            status_updated_at: Set(now),
        };
        let inserted = model.insert(&self.db).await.map_err(insert_err)?;

        model_to_domain(inserted)
    }

    async fn get(&self, id: BookingId) -> DomainResult<Booking> {
        let model = booking::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::booking_not_found(id))?;
        model_to_domain(model)
    }

    async fn find_by_slot(
        &self,
        venue_id: VenueId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Option<Booking>> {
        booking::Entity::find()
            .filter(booking::Column::VenueId.eq(venue_id.0))
            .filter(booking::Column::StartTime.eq(start))
            .filter(booking::Column::EndTime.eq(end))
            .filter(booking::Column::Status.is_in(ACTIVE_STATUSES))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn update_status(
        &self,
        id: BookingId,
        new_status: BookingStatus,
        expected: BookingStatus,
    ) -> DomainResult<Booking> {
        BookingStatus::check_transition(expected, new_status)?;
        debug!("Updating booking {} status: {} -> {}", id, expected, new_status);

        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(new_status.as_str()))
            .col_expr(booking::Column::StatusUpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Id.eq(id.0))
            .filter(booking::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self.get(id).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(ConflictKind::StatusChanged {
                expected,
                actual: current.status,
            }));
        }
        Ok(current)
    }

    async fn record_payment_order(&self, id: BookingId, order_id: &str) -> DomainResult<()> {
        debug!("Recording payment order {} for booking {}", order_id, id);
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::PaymentOrderId, Expr::value(order_id))
            .filter(booking::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::booking_not_found(id));
        }
        Ok(())
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::CustomerPhone.eq(phone.trim()))
            .order_by_desc(booking::Column::CreatedAt)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_open_matches(&self, now: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Paid.as_str()))
            .filter(booking::Column::SeekingOpponent.eq(true))
            .filter(booking::Column::StartTime.gt(now))
            .order_by_asc(booking::Column::StartTime)
            .order_by_asc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_pending_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()))
            .filter(booking::Column::CreatedAt.lt(cutoff))
            .order_by_asc(booking::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

// ── Tests ──────────────────────────────────────────────────────
