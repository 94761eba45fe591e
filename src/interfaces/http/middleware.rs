//! Authentication middleware for Axum
//!
//! Write endpoints require `Authorization: Bearer <jwt>`. The verified claims
//! become an [`Actor`] request extension that handlers read with
//! `Extension<Actor>`.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::identity::Actor;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::interfaces::http::common::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from the `Authorization` header.
pub fn authenticate(auth_header: Option<&str>, config: &JwtConfig) -> Result<Actor, AuthError> {
    let header = auth_header.ok_or(AuthError::MissingToken)?;
    let token = extract_token(header).ok_or(AuthError::InvalidToken)?;
    match verify_token(token, config) {
        Ok(claims) => Ok(claims.to_actor()),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::ExpiredToken),
            _ => Err(AuthError::InvalidToken),
        },
    }
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(header, &auth_state.jwt_config) {
        Ok(actor) => {
            tracing::debug!(actor = %actor.id, role = actor.role.as_str(), "Authenticated");
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(e) => auth_error_response(e),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
    };
    (StatusCode::UNAUTHORIZED, Json(ApiResponse::<()>::error(message))).into_response()
}
