//! Payment provider contract
//!
//! The provider is an external party. This module only describes what the
//! booking core asks of it and how its status vocabulary maps onto
//! `BookingStatus`.

pub mod model;
pub mod provider;

pub use model::{
    map_provider_status, PaymentHandle, PaymentSession, PaymentSessionRequest,
    ProviderPaymentStatus,
};
pub use provider::PaymentProvider;
