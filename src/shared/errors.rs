use thiserror::Error;

use crate::domain::booking::{BookingId, BookingStatus};

/// Why a write was refused because of concurrent or prior state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// The slot already holds a `PENDING` or `PAID` booking.
    SlotTaken,
    /// A transition was requested from a terminal status.
    AlreadySettled(BookingStatus),
    /// The compare-and-swap on a booking status found a different status.
    StatusChanged {
        expected: BookingStatus,
        actual: BookingStatus,
    },
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotTaken => write!(f, "slot is already taken"),
            Self::AlreadySettled(status) => write!(f, "booking is already {}", status),
            Self::StatusChanged { expected, actual } => {
                write!(f, "status changed (expected {}, found {})", expected, actual)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Booking {booking_id} is {status}, expected PENDING")]
    InvalidState {
        booking_id: BookingId,
        status: BookingStatus,
    },

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Network: {0}")]
    Network(String),

    /// Provider outage or malformed reply; worth retrying.
    #[error("Upstream: {0}")]
    Upstream(String),

    /// The provider refused the request itself; retrying cannot help.
    #[error("Rejected by payment provider: {0}")]
    ProviderRejected(String),
}

impl DomainError {
    pub fn booking_not_found(id: BookingId) -> Self {
        Self::NotFound {
            entity: "Booking",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn venue_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Venue",
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether this error is likely transient (storage or provider blip)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Upstream(_))
    }

    pub fn is_slot_taken(&self) -> bool {
        matches!(self, Self::Conflict(ConflictKind::SlotTaken))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Database(e) => DomainError::Network(format!("Database error: {}", e)),
            InfraError::Http(e) => DomainError::Upstream(e.to_string()),
            InfraError::Serialization(e) => {
                DomainError::Upstream(format!("Malformed provider payload: {}", e))
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
