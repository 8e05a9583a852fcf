//! Scrape endpoints.
//!
//! - `/metrics`         : request instruments (custom registry)
//! - `/default-metrics` : process and runtime gauges

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use reqwatch_core::metrics::TEXT_FORMAT;

use crate::app_state::AppState;

fn exposition(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    exposition(state.metrics().export())
}

pub async fn default_metrics(State(state): State<AppState>) -> Response {
    exposition(state.default_metrics().gather())
}
