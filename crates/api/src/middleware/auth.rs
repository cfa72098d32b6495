//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};
use ledgersync_shared::{Claims, JwtError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates the bearer token and stores its claims in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => {
            ApiError::unauthorized("TOKEN_EXPIRED", "Token has expired").into_response()
        }
        Err(_) => {
            ApiError::unauthorized("INVALID_TOKEN", "Invalid or malformed token").into_response()
        }
    }
}

/// The authenticated actor.
///
/// Its ID is recorded as `created_by`, `approved_by`, `cancelled_by`,
/// `confirmed_by` or `voided_by` by the handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the actor ID from the claims.
    #[must_use]
    pub const fn actor_id(&self) -> Uuid {
        self.0.actor_id()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("UNAUTHORIZED", "Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("abc"), None);
    }
}
