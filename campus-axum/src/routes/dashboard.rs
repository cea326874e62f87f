//! GET /dashboard: per-tenant collection counts for staff.

use axum::extract::State;
use axum::{middleware, routing, Json, Router};
use campus_core::Filter;
use serde_json::{json, Value};

use crate::guard::{require_role, STAFF};
use crate::routes::shared::scope;
use crate::session::Authenticated;
use crate::{AppState, CampusAxumError, RECORD_COLLECTIONS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/dashboard",
            routing::get(
                |State(state): State<AppState>, Authenticated(principal): Authenticated| async move {
                    let scope = scope(&state, &principal)?;

                    let mut counts: Value = json!({
                        "students": scope.collection("students").count(Filter::new()).await?,
                        "teachers": scope.collection("teachers").count(Filter::new()).await?,
                    });
                    for collection in RECORD_COLLECTIONS.iter().copied() {
                        counts[collection] =
                            json!(scope.collection(collection).count(Filter::new()).await?);
                    }

                    Ok::<_, CampusAxumError>(Json(counts))
                },
            ),
        )
        .route_layer(middleware::from_fn(move |request, next| {
            require_role(STAFF, request, next)
        }))
}
