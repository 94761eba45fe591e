//! Request identity and per-request context
//!
//! The core trusts the actor it is given; credentials are checked at the edge.

use crate::domain::booking::BookingId;

/// Actor role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    /// Unknown role strings fall back to the least privileged role.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

/// An already-authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Explicit per-request context passed into the submission path.
///
/// `resume_booking_id` replaces any client-side "last booking" storage: when
/// set, the submission returns that booking instead of creating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Actor,
    pub resume_booking_id: Option<BookingId>,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            resume_booking_id: None,
        }
    }

    pub fn resuming(mut self, id: Option<BookingId>) -> Self {
        self.resume_booking_id = id;
        self
    }
}
