//! campus-axum: the HTTP surface of the campus backend.
//!
//! Routing layout:
//! - public: `/health`, `POST /authentication`, `POST /tenants`
//! - everything else sits behind the session guard, with per-route role
//!   guards on top, and acts only on the tenant embedded in the token.

mod error;
mod guard;
pub mod routes;
mod session;
mod state;

use std::sync::Arc;

use anyhow::Result;
use axum::{middleware, routing, Router};
use campus_auth::AuthOptions;
use campus_core::errors::CampusError;
use campus_core::{Datastore, MemoryStore, Role};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use error::CampusAxumError;
pub use guard::{require_role, ADMIN_ONLY, STAFF};
pub use session::{require_session, Authenticated};
pub use state::AppState;

/// Tenant-owned record collections served under their own path each.
pub const RECORD_COLLECTIONS: &[&str] = &["attendance", "grades", "books", "allocations"];

pub struct CampusApp {
    pub router: Router,
    pub state: AppState,
}

impl CampusApp {
    pub async fn listen<A>(self, addr: A) -> Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

pub fn build(options: AuthOptions, store: Arc<dyn Datastore>) -> Result<CampusApp> {
    options
        .validate()
        .map_err(|e| CampusError::bad_request(e).into_anyhow())?;
    let state = AppState::new(options, store);

    let public = Router::new()
        .route("/health", routing::get(|| async { "ok" }))
        .route("/authentication", routing::post(routes::login::create_session))
        .route("/tenants", routing::post(routes::bootstrap::create_tenant));

    let mut protected = Router::new()
        .merge(routes::roster::router(Role::Student, STAFF))
        .merge(routes::roster::router(Role::Teacher, STAFF))
        .merge(routes::dashboard::router());
    for collection in RECORD_COLLECTIONS.iter().copied() {
        protected = protected.merge(routes::records::router(collection));
    }
    let protected = protected.route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_session,
    ));

    let router = public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state.clone());

    Ok(CampusApp { router, state })
}

/// Convenience for tests and local runs: everything in one process.
pub fn build_in_memory(options: AuthOptions) -> Result<CampusApp> {
    build(options, Arc::new(MemoryStore::new()))
}
