//! Shared error-reporting helper for handlers.
//!
//! Every error written to a client is logged first, then sent as a plain-text
//! body. Callers pick the status: 400 for bad input, 500 for faults.

use std::fmt::Display;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use reqwatch_core::error::{ErrorClass, ReqwatchError};

pub fn http_error(err: impl Display, status: StatusCode) -> Response {
    let msg = err.to_string();
    if status.is_server_error() {
        tracing::error!(%status, error = %msg, "request failed");
    } else {
        tracing::warn!(%status, error = %msg, "request rejected");
    }
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        msg,
    )
        .into_response()
}

pub fn bad_request(err: impl Display) -> Response {
    http_error(err, StatusCode::BAD_REQUEST)
}

pub fn internal_error(err: impl Display) -> Response {
    http_error(err, StatusCode::INTERNAL_SERVER_ERROR)
}

/// Pick the status from the error's class.
pub fn from_error(err: &ReqwatchError) -> Response {
    match err.status_class() {
        ErrorClass::Client => bad_request(err),
        ErrorClass::Server => internal_error(err),
    }
}
