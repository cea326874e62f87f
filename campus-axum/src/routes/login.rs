//! POST /authentication: the only tenant-header-driven operation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use campus_auth::{Credentials, Session};

use crate::routes::shared::map_json_rejection;
use crate::{AppState, CampusAxumError};

pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, CampusAxumError> {
    let Json(credentials) = body.map_err(map_json_rejection)?;

    let tenant_code = headers
        .get(state.options.tenant_header.as_str())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let session = state.auth.login(tenant_code, &credentials).await?;
    Ok(Json(session))
}
