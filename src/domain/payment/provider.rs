//! Payment provider port

use async_trait::async_trait;

use super::model::{PaymentSession, PaymentSessionRequest};
use crate::domain::booking::BookingStatus;
use crate::domain::DomainResult;

/// External payment gateway as seen by the booking core.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a payment session and return where to send the customer.
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> DomainResult<PaymentSession>;

    /// Current payment status of an order, already mapped to the booking
    /// vocabulary. An order the provider has never seen reports `PENDING`.
    async fn get_payment_status(&self, order_id: &str) -> DomainResult<BookingStatus>;
}
