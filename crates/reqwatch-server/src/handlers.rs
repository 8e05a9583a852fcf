//! Built-in endpoints served next to the scrape routes.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use reqwatch_core::error::{ReqwatchError, Result};

use crate::app_state::AppState;
use crate::http_error;

/// Largest n whose Fibonacci number fits in a u64.
pub const MAX_FIBONACCI_INPUT: u64 = 93;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/fibonacci", get(fibonacci))
        .fallback(not_found)
}

pub async fn root() -> &'static str {
    "This is a simple web server used for demonstrating observability.\n"
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}

#[derive(Debug, Deserialize)]
pub struct FibonacciQuery {
    number: Option<String>,
}

pub async fn fibonacci(Query(q): Query<FibonacciQuery>) -> Response {
    match parse_number(q.number.as_deref()) {
        Ok(n) => fib(n).to_string().into_response(),
        Err(e) => http_error::from_error(&e),
    }
}

fn parse_number(raw: Option<&str>) -> Result<u64> {
    let raw = raw.ok_or_else(|| ReqwatchError::BadRequest("number is required".into()))?;
    let n: u64 = raw
        .parse()
        .map_err(|e| ReqwatchError::BadRequest(format!("number {raw:?} is invalid: {e}")))?;
    if n > MAX_FIBONACCI_INPUT {
        return Err(ReqwatchError::BadRequest(format!(
            "number must be at most {MAX_FIBONACCI_INPUT}"
        )));
    }
    Ok(n)
}

pub fn fib(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        (a, b) = (b, a + b);
    }
    b
}
