//! Shared HTTP types

pub mod validated_json;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::errors::DomainError;

pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// On success: `{"success": true, "data": {...}}`,
/// on failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error, rendered as an `ApiResponse` with the matching status.
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Forbidden(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

/// HTTP status for each domain error kind.
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) | DomainError::InvalidState { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Upstream(_) | DomainError::ProviderRejected(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Domain(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    tracing::warn!(error = %err, "Request failed");
                }
                (status, err.to_string())
            }
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingId, BookingStatus};
    use crate::shared::errors::ConflictKind;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::booking_not_found(BookingId(1)), StatusCode::NOT_FOUND),
            (DomainError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                DomainError::InvalidState {
                    booking_id: BookingId(1),
                    status: BookingStatus::Paid,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DomainError::Conflict(ConflictKind::SlotTaken), StatusCode::CONFLICT),
            (DomainError::Network("db".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::Upstream("502".into()), StatusCode::BAD_GATEWAY),
            (DomainError::ProviderRejected("400".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{}", err);
        }
    }

    #[test]
    fn error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json["data"].is_null());
    }
}
