use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::booking::PaymentNotification;
use crate::domain::payment::{PaymentHandle, ProviderPaymentStatus};

/// Where to send the customer to pay
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentHandleDto {
    pub booking_id: i32,
    pub redirect_url: String,
    /// Provider session token
    pub token: String,
    pub amount: i64,
}

impl From<PaymentHandle> for PaymentHandleDto {
    fn from(h: PaymentHandle) -> Self {
        Self {
            booking_id: h.booking_id.0,
            redirect_url: h.redirect_url,
            token: h.provider_ref,
            amount: h.amount,
        }
    }
}

/// Status callback posted by the payment provider
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentNotificationRequest {
    pub order_id: String,
    pub status_code: String,
    /// Amount exactly as the provider formats it (e.g. `"100000.00"`)
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

impl PaymentNotificationRequest {
    pub fn to_notification(&self) -> PaymentNotification {
        PaymentNotification {
            order_id: self.order_id.clone(),
            status: ProviderPaymentStatus::new(
                self.transaction_status.clone(),
                self.fraud_status.clone(),
            ),
        }
    }
}
