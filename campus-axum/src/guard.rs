//! Role guards.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use campus_core::errors::CampusError;
use campus_core::{PrincipalContext, Role};
use tracing::debug;

use crate::CampusAxumError;

/// Roles allowed to read rosters and manage day-to-day records.
pub const STAFF: &[Role] = &[Role::Admin, Role::Teacher];

/// Roles allowed to create, suspend and delete principals.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Route layer rejecting any principal whose role is not in `allowed`.
///
/// Runs after session validation, so a missing principal here means the
/// guard was layered onto an unauthenticated route; that too fails closed.
pub async fn require_role(allowed: &'static [Role], request: Request, next: Next) -> Response {
    let Some(principal) = request.extensions().get::<PrincipalContext>() else {
        return CampusAxumError::from(CampusError::not_authenticated(
            "No session on this request",
        ))
        .into_response();
    };
    if !allowed.contains(&principal.role) {
        debug!(role = principal.role.as_str(), "role not permitted");
        return CampusAxumError::from(CampusError::forbidden(
            "Role is not permitted to perform this operation",
        ))
        .into_response();
    }
    next.run(request).await
}
