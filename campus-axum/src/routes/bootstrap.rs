//! POST /tenants: atomic tenant + first-admin bootstrap.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use campus_auth::{AdminAttrs, TenantAttrs};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::routes::shared::map_json_rejection;
use crate::{AppState, CampusAxumError};

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub tenant: TenantAttrs,
    pub admin: AdminAttrs,
}

pub async fn create_tenant(
    State(state): State<AppState>,
    body: Result<Json<BootstrapRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), CampusAxumError> {
    let Json(request) = body.map_err(map_json_rejection)?;

    let (tenant, admin) = state
        .bootstrap
        .create_tenant_with_admin(request.tenant, request.admin)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"tenant": tenant, "admin": admin})),
    ))
}
