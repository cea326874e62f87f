//! Helpers shared by the resource routes.

use axum::extract::rejection::JsonRejection;
use campus_core::errors::CampusError;
use campus_core::{Filter, PrincipalContext, TenantScope};
use serde_json::{json, Value};

use crate::{AppState, CampusAxumError};

pub fn map_json_rejection(rejection: JsonRejection) -> CampusAxumError {
    CampusError::bad_request("Failed to parse the request body as JSON")
        .with_data(json!({"_schema": [rejection.to_string()]}))
        .into()
}

/// A scope bound to the tenant embedded in the session claims. This is the
/// only way resource handlers touch the store.
pub fn scope(state: &AppState, principal: &PrincipalContext) -> anyhow::Result<TenantScope> {
    TenantScope::new(std::sync::Arc::clone(&state.store), &principal.tenant())
}

/// Interpret a JSON body as a set of field changes.
pub fn as_changes(body: Value) -> Result<Filter, CampusAxumError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(CampusError::bad_request("Expected a JSON object").into()),
    }
}
