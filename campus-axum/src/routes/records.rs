//! Tenant-owned record collections (attendance, grades, books, allocations).
//!
//! These are free-form documents; the only invariants enforced here are
//! tenant scoping and the role table. Staff create and edit, every
//! authenticated principal of the tenant may read, only admins delete.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{middleware, routing, Json, Router};
use campus_core::errors::CampusError;
use campus_core::{filter_eq, Filter};
use serde_json::Value;

use crate::guard::{require_role, ADMIN_ONLY, STAFF};
use crate::routes::shared::{as_changes, map_json_rejection, scope};
use crate::session::Authenticated;
use crate::{AppState, CampusAxumError};

pub fn router(collection: &'static str) -> Router<AppState> {
    let base = format!("/{collection}");
    let item = format!("/{collection}/{{id}}");

    let reads = Router::new()
        .route(
            &base,
            routing::get(
                move |State(state): State<AppState>, Authenticated(principal): Authenticated| async move {
                    let scope = scope(&state, &principal)?;
                    let rows = scope.collection(collection).find(Filter::new()).await?;
                    Ok::<_, CampusAxumError>(Json(Value::Array(rows)))
                },
            ),
        )
        .route(
            &item,
            routing::get(
                move |State(state): State<AppState>,
                      Authenticated(principal): Authenticated,
                      Path(id): Path<String>| async move {
                    let scope = scope(&state, &principal)?;
                    let found = scope
                        .collection(collection)
                        .find_one(filter_eq("id", id.as_str()))
                        .await?
                        .ok_or_else(|| CampusError::not_found("No such record"))?;
                    Ok::<_, CampusAxumError>(Json(found))
                },
            ),
        );

    let staff = Router::new()
        .route(
            &base,
            routing::post(
                move |State(state): State<AppState>,
                      Authenticated(principal): Authenticated,
                      data: Result<Json<Value>, JsonRejection>| async move {
                    let Json(body) = data.map_err(map_json_rejection)?;
                    if !body.is_object() {
                        return Err(CampusError::bad_request("Expected a JSON object").into());
                    }
                    let scope = scope(&state, &principal)?;
                    let created = scope.collection(collection).insert(body).await?;
                    Ok::<_, CampusAxumError>((StatusCode::CREATED, Json(created)))
                },
            ),
        )
        .route(
            &item,
            routing::patch(
                move |State(state): State<AppState>,
                      Authenticated(principal): Authenticated,
                      Path(id): Path<String>,
                      data: Result<Json<Value>, JsonRejection>| async move {
                    let Json(body) = data.map_err(map_json_rejection)?;
                    let changes = as_changes(body)?;
                    let scope = scope(&state, &principal)?;
                    let updated = scope
                        .collection(collection)
                        .find_one_and_update(filter_eq("id", id.as_str()), changes)
                        .await?
                        .ok_or_else(|| CampusError::not_found("No such record"))?;
                    Ok::<_, CampusAxumError>(Json(updated))
                },
            ),
        )
        .route_layer(middleware::from_fn(move |request, next| {
            require_role(STAFF, request, next)
        }));

    let admin = Router::new()
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
                    Ok::<_, CampusAxumError>(Json(removed))
                },
            ),
        )
        .route_layer(middleware::from_fn(move |request, next| {
            require_role(ADMIN_ONLY, request, next)
        }));

    reads.merge(staff).merge(admin)
}
