//! Booking domain entity

use chrono::{DateTime, Duration, Utc};

use crate::domain::venue::VenueId;
use crate::domain::DomainResult;
use crate::shared::errors::{ConflictKind, DomainError};

/// Opaque booking identifier, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookingId(pub i32);

impl BookingId {
    /// Base provider order reference, `booking-{id}`.
    pub fn order_id(&self) -> String {
        format!("booking-{}", self.0)
    }

    /// Order reference for one payment session, `booking-{id}-{stamp}`.
    ///
    /// The provider refuses a reused order id, so every session carries its
    /// own stamp.
    pub fn session_order_id(&self, stamp: i64) -> String {
        format!("booking-{}-{}", self.0, stamp)
    }

    /// Booking id from either order reference form.
    pub fn from_order_id(order_id: &str) -> Result<Self, DomainError> {
        let rest = order_id
            .strip_prefix("booking-")
            .ok_or_else(|| DomainError::Validation(format!("Unrecognised order id: {}", order_id)))?;
        match rest.split_once('-') {
            Some((id, stamp)) if !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()) => {
                id.parse()
            }
            Some(_) => Err(DomainError::Validation(format!(
                "Unrecognised order id: {}",
                order_id
            ))),
            None => rest.parse(),
        }
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BookingId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(BookingId)
            .map_err(|_| DomainError::Validation(format!("Invalid booking id: {}", s)))
    }
}

/// Booking lifecycle status
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Created, waiting for payment
    Pending,
    /// Payment settled
    Paid,
    /// Cancelled by the customer or the provider
    Cancelled,
    /// Payment window elapsed
    Expired,
    /// Payment refused by the provider
    Denied,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Cancelled,
        Self::Expired,
        Self::Denied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
            Self::Denied => "DENIED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Pending => false,
            Self::Paid | Self::Cancelled | Self::Expired | Self::Denied => true,
        }
    }

    /// Whether a booking in this status holds its slot.
    pub fn occupies_slot(&self) -> bool {
        match self {
            Self::Pending | Self::Paid => true,
            Self::Cancelled | Self::Expired | Self::Denied => false,
        }
    }

    /// Check a requested `expected -> next` transition before it reaches the
    /// store's compare-and-swap.
    ///
    /// Transitions out of a terminal status are conflicts; a transition back
    /// to `Pending` is malformed input.
    pub fn check_transition(expected: BookingStatus, next: BookingStatus) -> DomainResult<()> {
        if expected.is_terminal() {
            return Err(DomainError::Conflict(ConflictKind::AlreadySettled(expected)));
        }
        if !next.is_terminal() {
            return Err(DomainError::Validation(format!(
                "Cannot transition booking from {} to {}",
                expected, next
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "CANCELLED" | "CANCELED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            "DENIED" | "DENY" => Ok(Self::Denied),
            other => Err(DomainError::Validation(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

/// Contact details captured with a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub team_name: Option<String>,
    /// Listed among open matches once paid
    pub seeking_opponent: bool,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            team_name: None,
            seeking_opponent: false,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Customer name is required".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(DomainError::Validation("Customer phone is required".into()));
        }
        Ok(())
    }
}

/// The reserved interval at a venue; the unit of exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub venue_id: VenueId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A booking about to be persisted; the store assigns id, status and timestamps.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub venue_id: VenueId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer: Customer,
    /// Authenticated actor that placed the booking
    pub user_id: Option<String>,
    /// Whole currency units
    pub total_price: i64,
}

impl NewBooking {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            venue_id: self.venue_id,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// Materialise the record with a store-assigned id.
    pub fn into_booking(self, id: BookingId, now: DateTime<Utc>) -> Booking {
        Booking {
            id,
            venue_id: self.venue_id,
            start_time: self.start_time,
            end_time: self.end_time,
            customer: self.customer,
            user_id: self.user_id,
            total_price: self.total_price,
            status: BookingStatus::Pending,
            payment_order_id: None,
            created_at: now,
            status_updated_at: now,
        }
    }
}

/// Venue booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub venue_id: VenueId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub customer: Customer,
    pub user_id: Option<String>,
    /// Whole currency units, fixed at creation
    pub total_price: i64,
    pub status: BookingStatus,
    /// Order reference of the latest payment session, if one was opened
    pub payment_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            venue_id: self.venue_id,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn occupies_slot(&self) -> bool {
        self.status.occupies_slot()
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Reference to query the provider with: the latest session's order id,
    /// or the base reference before any session was opened.
    pub fn order_id(&self) -> String {
        self.payment_order_id
            .clone()
            .unwrap_or_else(|| self.id.order_id())
    }
}

// ── Tests ──────────────────────────────────────────────────────
