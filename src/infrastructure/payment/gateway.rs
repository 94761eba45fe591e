//! HTTP client for the hosted payment gateway
//!
//! Speaks a Snap-style API: `POST /snap/v1/transactions` opens a session and
//! `GET /v2/{order_id}/status` reports the transaction state. Requests
//! authenticate with HTTP Basic using the server key as the user name.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::booking::BookingStatus;
use crate::domain::payment::{
    PaymentProvider, PaymentSession, PaymentSessionRequest, ProviderPaymentStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::shared::errors::InfraError;

#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    pub base_url: String,
    pub server_key: String,
    /// Where the provider sends the customer after payment
    pub finish_url: Option<String>,
    pub request_timeout: Duration,
}

pub struct HttpPaymentGateway {
    http: reqwest::Client,
    base_url: String,
    finish_url: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(config: &PaymentGatewayConfig) -> DomainResult<Self> {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", config.server_key));
        let mut auth = HeaderValue::from_str(&format!("Basic {}", token))
            .map_err(|e| DomainError::Validation(format!("Invalid payment server key: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("venue-booking/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(http_err)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            finish_url: config.finish_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateTransactionBody<'a> {
    transaction_details: TransactionDetails<'a>,
    customer_details: CustomerDetails<'a>,
    item_details: [ItemDetails<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    callbacks: Option<Callbacks<'a>>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CustomerDetails<'a> {
    first_name: &'a str,
    phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ItemDetails<'a> {
    id: &'a str,
    price: i64,
    quantity: u32,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Callbacks<'a> {
    finish: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTransactionResponse {
    token: String,
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct TransactionStatusResponse {
    #[serde(default)]
    status_code: Option<String>,
    #[serde(default)]
    transaction_status: Option<String>,
    #[serde(default)]
    fraud_status: Option<String>,
}

// ── Error mapping ───────────────────────────────────────────────

fn http_err(e: reqwest::Error) -> DomainError {
    if e.is_timeout() || e.is_connect() {
        DomainError::Network(format!("Payment gateway unreachable: {}", e))
    } else {
        InfraError::Http(e).into()
    }
}

/// Map a non-success reply. Client errors are final except for request
/// timeout and rate limiting; server errors may clear on retry.
async fn upstream_status(resp: reqwest::Response) -> DomainError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = format!("Payment gateway returned {}: {}", status, body.trim());
    let retryable = status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS;
    if retryable {
        DomainError::Upstream(message)
    } else {
        DomainError::ProviderRejected(message)
    }
}

// ── PaymentProvider impl ────────────────────────────────────────

#[async_trait]
impl PaymentProvider for HttpPaymentGateway {
    async fn create_payment_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> DomainResult<PaymentSession> {
        let item_id = request.booking_id.to_string();
        let body = CreateTransactionBody {
            transaction_details: TransactionDetails {
                order_id: &request.order_id,
                gross_amount: request.amount,
            },
            customer_details: CustomerDetails {
                first_name: &request.customer.name,
                phone: &request.customer.phone,
                email: request.customer.email.as_deref(),
            },
            item_details: [ItemDetails {
                id: &item_id,
                price: request.amount,
                quantity: 1,
                name: &request.item_name,
            }],
            callbacks: self.finish_url.as_deref().map(|finish| Callbacks { finish }),
        };

        debug!(order_id = %request.order_id, "Creating payment session");
        let resp = self
            .http
            .post(self.url("/snap/v1/transactions"))
            .json(&body)
            .send()
            .await
            .map_err(http_err)?;

        if !resp.status().is_success() {
            return Err(upstream_status(resp).await);
        }
        let created: CreateTransactionResponse = resp.json().await.map_err(http_err)?;
        Ok(PaymentSession {
            redirect_url: created.redirect_url,
            provider_ref: created.token,
        })
    }

    async fn get_payment_status(&self, order_id: &str) -> DomainResult<BookingStatus> {
        let resp = self
            .http
            .get(self.url(&format!("/v2/{}/status", order_id)))
            .send()
            .await
            .map_err(http_err)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(BookingStatus::Pending);
        }
        if !resp.status().is_success() {
            return Err(upstream_status(resp).await);
        }

        let body: TransactionStatusResponse = resp.json().await.map_err(http_err)?;
        // The gateway answers unknown orders with 200 and an in-body 404.
        if body.status_code.as_deref() == Some("404") {
            return Ok(BookingStatus::Pending);
        }
        let transaction_status = body.transaction_status.ok_or_else(|| {
            DomainError::Upstream(format!("No transaction_status for {}", order_id))
        })?;
        debug!(order_id = %order_id, transaction_status = %transaction_status, "Payment status fetched");
        ProviderPaymentStatus::new(transaction_status, body.fraud_status).to_booking_status()
    }
}
