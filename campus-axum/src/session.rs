//! Session validation for protected routes.
//!
//! Every protected request must present `Authorization: Bearer <token>`.
//! The token's claims are the only source of principal and tenant context
//! from here on; a tenant header on a protected request is ignored.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use campus_core::errors::CampusError;
use campus_core::PrincipalContext;

use crate::{AppState, CampusAxumError};

fn bearer_token(headers: &HeaderMap) -> Result<&str, CampusError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CampusError::not_authenticated("Missing Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CampusError::not_authenticated("Expected a Bearer token"))
}

/// Route layer guarding everything behind authentication.
///
/// Verification happens before the inner handler is ever constructed; a
/// request without a valid session never reaches business logic.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match bearer_token(request.headers()) {
        Ok(token) => match state.tokens.verify(token) {
            Ok(principal) => principal,
            Err(err) => return CampusAxumError(err).into_response(),
        },
        Err(err) => return CampusAxumError::from(err).into_response(),
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

/// Extractor for the validated principal placed by [`require_session`].
///
/// Fails closed: on a route that was not layered with the session guard
/// this rejects instead of conjuring an anonymous principal.
pub struct Authenticated(pub PrincipalContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = CampusAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PrincipalContext>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| CampusError::not_authenticated("No session on this request").into())
    }
}
