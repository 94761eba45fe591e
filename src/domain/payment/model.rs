//! Payment session types and the provider status vocabulary

use crate::domain::booking::{BookingId, BookingStatus, Customer};
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// What the core sends to the provider to open a payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSessionRequest {
    pub booking_id: BookingId,
    /// Provider-side order reference, unique per booking
    pub order_id: String,
    /// Whole currency units
    pub amount: i64,
    pub customer: Customer,
    pub item_name: String,
}

/// Provider reply to a session request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub redirect_url: String,
    pub provider_ref: String,
}

/// Handle returned to the client after initiating a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHandle {
    pub booking_id: BookingId,
    pub redirect_url: String,
    pub provider_ref: String,
    pub amount: i64,
}

/// Raw transaction state as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPaymentStatus {
    pub transaction_status: String,
    pub fraud_status: Option<String>,
}

impl ProviderPaymentStatus {
    pub fn new(transaction_status: impl Into<String>, fraud_status: Option<String>) -> Self {
        Self {
            transaction_status: transaction_status.into(),
            fraud_status,
        }
    }

    pub fn to_booking_status(&self) -> DomainResult<BookingStatus> {
        map_provider_status(&self.transaction_status, self.fraud_status.as_deref())
    }
}

/// Map the provider's transaction vocabulary onto a booking status.
///
/// A `capture` flagged for fraud review stays `PENDING` until the provider
/// decides. Unknown values are an upstream fault.
pub fn map_provider_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> DomainResult<BookingStatus> {
    let fraud = fraud_status.map(|s| s.trim().to_ascii_lowercase());
    match transaction_status.trim().to_ascii_lowercase().as_str() {
        "settlement" => Ok(BookingStatus::Paid),
        "capture" => match fraud.as_deref() {
            Some("challenge") => Ok(BookingStatus::Pending),
            Some("deny") => Ok(BookingStatus::Denied),
            _ => Ok(BookingStatus::Paid),
        },
        "pending" => Ok(BookingStatus::Pending),
        "deny" => Ok(BookingStatus::Denied),
        "cancel" => Ok(BookingStatus::Cancelled),
        "expire" => Ok(BookingStatus::Expired),
        other => Err(DomainError::Upstream(format!(
            "Unknown provider transaction status: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_and_capture_are_paid() {
        assert_eq!(map_provider_status("settlement", None).unwrap(), BookingStatus::Paid);
        assert_eq!(map_provider_status("capture", Some("accept")).unwrap(), BookingStatus::Paid);
        assert_eq!(map_provider_status("CAPTURE", None).unwrap(), BookingStatus::Paid);
    }

    #[test]
    fn challenged_capture_stays_pending() {
        let status = ProviderPaymentStatus::new("capture", Some("challenge".into()));
        assert_eq!(status.to_booking_status().unwrap(), BookingStatus::Pending);
    }

    #[test]
    fn failure_vocabulary() {
        assert_eq!(map_provider_status("deny", None).unwrap(), BookingStatus::Denied);
        assert_eq!(map_provider_status("cancel", None).unwrap(), BookingStatus::Cancelled);
        assert_eq!(map_provider_status("expire", None).unwrap(), BookingStatus::Expired);
        assert_eq!(map_provider_status("pending", None).unwrap(), BookingStatus::Pending);
    }

    #[test]
    fn unknown_status_is_upstream_error() {
        let err = map_provider_status("refund", None).unwrap_err();
        assert!(matches!(err, DomainError::Upstream(_)));
    }
}
