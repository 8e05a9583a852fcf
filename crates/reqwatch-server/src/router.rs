//! Axum router wiring.
//!
//! Scrape endpoints are added to whatever routes the caller supplies, then the
//! instrumentation middleware is layered over all of them, fallback included.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, handlers, middleware::track_metrics, ops};

pub fn build_router(state: AppState) -> Router {
    instrument(handlers::routes(), state)
}

pub fn instrument(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .route("/metrics", get(ops::metrics))
        .route("/default-metrics", get(ops::default_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .with_state(state)
}
