//! Payment gateway adapter

pub mod gateway;
pub mod signature;

pub use gateway::{HttpPaymentGateway, PaymentGatewayConfig};
pub use signature::{notification_signature, verify_notification_signature};
