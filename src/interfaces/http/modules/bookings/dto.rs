//! Booking DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::booking::BookingRequest;
use crate::domain::booking::{Booking, BookingId, Customer};
use crate::domain::venue::VenueId;

/// Slot selection plus contact details
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub venue_id: i32,
    /// Slot start (RFC 3339)
    pub start_time: DateTime<Utc>,
    /// Slot end (RFC 3339); must be exactly one slot after `start_time`
    pub end_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 100, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 6, max = 20, message = "phone must be 6-20 characters"))]
    pub customer_phone: String,
    #[validate(email)]
    pub customer_email: Option<String>,
    #[validate(length(max = 100))]
    pub team_name: Option<String>,
    /// Listed on the open-matches board once paid
    #[serde(default)]
    pub seeking_opponent: bool,
    /// Resume a booking created earlier in the same checkout instead of
    /// creating a new one
    pub existing_booking_id: Option<i32>,
}

impl CreateBookingRequest {
    pub fn resume_id(&self) -> Option<BookingId> {
        self.existing_booking_id.map(BookingId)
    }

    pub fn into_booking_request(self) -> BookingRequest {
        BookingRequest {
            venue_id: VenueId(self.venue_id),
            start_time: self.start_time,
            end_time: self.end_time,
            customer: Customer {
                name: self.customer_name.trim().to_string(),
                phone: self.customer_phone.trim().to_string(),
                email: self.customer_email.filter(|e| !e.trim().is_empty()),
                team_name: self.team_name.filter(|t| !t.trim().is_empty()),
                seeking_opponent: self.seeking_opponent,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: i32,
    /// Reference shared with the payment provider
    pub order_id: String,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub team_name: Option<String>,
    pub seeking_opponent: bool,
    pub total_price: i64,
    /// `PENDING`, `PAID`, `CANCELLED`, `EXPIRED` or `DENIED`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.0,
            order_id: b.order_id(),
            venue_id: b.venue_id.0,
            start_time: b.start_time,
            end_time: b.end_time,
            customer_name: b.customer.name,
            customer_phone: b.customer.phone,
            customer_email: b.customer.email,
            team_name: b.customer.team_name,
            seeking_opponent: b.customer.seeking_opponent,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            created_at: b.created_at,
            status_updated_at: b.status_updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PhoneQuery {
    /// Customer phone number used at checkout
    pub phone: String,
}
