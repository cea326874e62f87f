//! Principal rosters: one router per role collection.
//!
//! All reads and writes go through the tenant scope derived from the
//! caller's session, so a roster can never show or touch another college.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{middleware, routing, Json, Router};
use campus_auth::strip_password;
use campus_core::errors::CampusError;
use campus_core::{filter_eq, Filter, PrincipalStatus, Role};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::guard::{require_role, ADMIN_ONLY, STAFF};
use crate::routes::shared::{as_changes, map_json_rejection, scope};
use crate::session::Authenticated;
use crate::{AppState, CampusAxumError};

#[derive(Debug, Deserialize)]
pub struct PrincipalAttrs {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Fields a principal may change on their own record.
const SELF_EDITABLE: &[&str] = &["name", "password"];

/// Fields an admin may change on any record. Role never changes; status
/// changes are how suspension happens.
const ADMIN_EDITABLE: &[&str] = &["name", "email", "password", "status"];

pub fn router(role: Role, readers: &'static [Role]) -> Router<AppState> {
    let collection = role.collection();
    let base = format!("/{collection}");
    let item = format!("/{collection}/{{id}}");

    let listing = Router::new()
        .route(
            &base,
            routing::get(
                move |State(state): State<AppState>, Authenticated(principal): Authenticated| async move {
                    let scope = scope(&state, &principal)?;
                    let rows = scope.collection(collection).find(Filter::new()).await?;
                    let rows: Vec<Value> = rows.into_iter().map(strip_password).collect();
                    Ok::<_, CampusAxumError>(Json(Value::Array(rows)))
                },
            ),
        )
        .route_layer(middleware::from_fn(move |request, next| {
            require_role(readers, request, next)
        }));

    let admin = Router::new()
        .route(
            &base,
            routing::post(
                move |State(state): State<AppState>,
                      Authenticated(principal): Authenticated,
                      data: Result<Json<PrincipalAttrs>, JsonRejection>| async move {
                    let Json(attrs) = data.map_err(map_json_rejection)?;
                    let email = attrs.email.trim().to_string();
                    if attrs.name.trim().is_empty() || email.is_empty() {
                        return Err(CampusError::bad_request("Name and email are required").into());
                    }

                    let scope = scope(&state, &principal)?;
                    let roster = scope.collection(collection);
                    if roster.find_one(filter_eq("email", email.as_str())).await?.is_some() {
                        return Err(CampusError::conflict("Email is already registered").into());
                    }

                    let password_hash = state.hasher.hash_password(&attrs.password)?;
                    let created = roster
                        .insert(json!({
                            "name": attrs.name,
                            "email": email,
                            "password": password_hash,
                            "role": role,
                            "status": PrincipalStatus::Active,
                        }))
                        .await?;
                    Ok::<_, CampusAxumError>((StatusCode::CREATED, Json(strip_password(created))))
                },
            ),
        )
        .route(
            &item,
            routing::delete(
                move |State(state): State<AppState>,
                      Authenticated(principal): Authenticated,
                      Path(id): Path<String>| async move {
                    let scope = scope(&state, &principal)?;
                    let removed = scope
                        .collection(collection)
                        .find_one_and_delete(filter_eq("id", id.as_str()))
                        .await?
                        .ok_or_else(|| CampusError::not_found("No such record"))?;
                    Ok::<_, CampusAxumError>(Json(strip_password(removed)))
                },
            ),
        )
        .route_layer(middleware::from_fn(move |request, next| {
            require_role(ADMIN_ONLY, request, next)
        }));

    // Detail and patch carry their own ownership checks: staff may read any
    // record, a principal may read and partially edit their own.
    let member = Router::new().route(
        &item,
        routing::get(
            move |State(state): State<AppState>,
                  Authenticated(principal): Authenticated,
                  Path(id): Path<String>| async move {
                let is_staff = STAFF.contains(&principal.role);
                let is_self = principal.role == role && principal.principal_id == id;
                if !is_staff && !is_self {
                    return Err(CampusError::forbidden(
                        "Role is not permitted to perform this operation",
                    )
                    .into());
                }

                let scope = scope(&state, &principal)?;
                let found = scope
                    .collection(collection)
                    .find_one(filter_eq("id", id.as_str()))
                    .await?
                    .ok_or_else(|| CampusError::not_found("No such record"))?;
                Ok::<_, CampusAxumError>(Json(strip_password(found)))
            },
        )
        .patch(
            move |State(state): State<AppState>,
                  Authenticated(principal): Authenticated,
                  Path(id): Path<String>,
                  data: Result<Json<Value>, JsonRejection>| async move {
                let is_admin = principal.role == Role::Admin;
                let is_self = principal.role == role && principal.principal_id == id;
                if !is_admin && !is_self {
                    return Err(CampusError::forbidden(
                        "Role is not permitted to perform this operation",
                    )
                    .into());
                }

                let Json(body) = data.map_err(map_json_rejection)?;
                let mut changes = as_changes(body)?;
                let editable = if is_admin { ADMIN_EDITABLE } else { SELF_EDITABLE };
                changes.retain(|key, _| editable.contains(&key.as_str()));
                if changes.is_empty() {
                    return Err(
                        CampusError::bad_request("No editable fields in request").into()
                    );
                }

                match changes.get("password").cloned() {
                    Some(Value::String(plaintext)) => {
                        let hashed = state.hasher.hash_password(&plaintext)?;
                        changes.insert("password".to_string(), Value::String(hashed));
                    }
                    Some(_) => {
                        return Err(CampusError::bad_request("password must be a string").into())
                    }
                    None => {}
                }
                if let Some(status) = changes.get("status") {
                    serde_json::from_value::<PrincipalStatus>(status.clone()).map_err(|_| {
                        CampusError::bad_request("status must be 'active' or 'suspended'")
                    })?;
                }

                let scope = scope(&state, &principal)?;
                let updated = scope
                    .collection(collection)
                    .find_one_and_update(filter_eq("id", id.as_str()), changes)
                    .await?
                    .ok_or_else(|| CampusError::not_found("No such record"))?;
                Ok::<_, CampusAxumError>(Json(strip_password(updated)))
            },
        ),
    );

    listing.merge(admin).merge(member)
}
