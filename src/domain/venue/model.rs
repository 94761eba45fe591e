//! Venue domain entity
//!
//! Venues are owned by the catalog; this crate only reads them.

use std::collections::BTreeSet;

use chrono::Duration;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VenueId(pub i32);

impl std::fmt::Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sport category of a venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SportType {
    Futsal,
    Badminton,
    Basketball,
    Volleyball,
    Other(String),
}

impl SportType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Futsal => "FUTSAL",
            Self::Badminton => "BADMINTON",
            Self::Basketball => "BASKET",
            Self::Volleyball => "VOLI",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "FUTSAL" => Self::Futsal,
            "BADMINTON" => Self::Badminton,
            "BASKET" | "BASKETBALL" => Self::Basketball,
            "VOLI" | "VOLLEYBALL" => Self::Volleyball,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl std::fmt::Display for SportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookable venue (court)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub sport: SportType,
    pub location: String,
    /// Whole currency units per hour
    pub price_per_hour: i64,
    pub facilities: BTreeSet<String>,
    pub image_url: Option<String>,
}

impl Venue {
    /// Price of a reservation of the given length, rounded to the nearest
    /// whole currency unit.
    pub fn price_for(&self, duration: Duration) -> DomainResult<i64> {
        let minutes = duration.num_minutes();
        if minutes <= 0 {
            return Err(DomainError::Validation(
                "Booking duration must be positive".into(),
            ));
        }
        let cost = self
            .price_per_hour
            .checked_mul(minutes)
            .ok_or_else(|| DomainError::Validation("Booking price overflow".into()))?;
        Ok((cost + 30) / 60)
    }
}

/// A catalog entry about to be stored; the catalog assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    pub name: String,
    pub sport: SportType,
    pub location: String,
    pub price_per_hour: i64,
    pub facilities: BTreeSet<String>,
    pub image_url: Option<String>,
}

impl NewVenue {
    pub fn into_venue(self, id: VenueId) -> Venue {
        Venue {
            id,
            name: self.name,
            sport: self.sport,
            location: self.location,
            price_per_hour: self.price_per_hour,
            facilities: self.facilities,
            image_url: self.image_url,
        }
    }
}

/// Split a comma-separated facility list into tags.
pub fn parse_facilities(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Join facility tags back into their stored form.
pub fn join_facilities(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
