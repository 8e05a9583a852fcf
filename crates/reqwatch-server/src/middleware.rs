//! Request instrumentation middleware.
//!
//! Wraps every route (and the fallback) so each completed request bumps the
//! total counter, records its duration, and bumps the failed counter when the
//! final status is 5xx. The route label is the matched template
//! (`/video/:id`), or the literal path when nothing matched. Unmatched paths
//! therefore add one series per distinct path; that growth is not capped.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::app_state::AppState;
use crate::obs::MetricsService;

/// Per-request record, consumed by [`RequestObservation::finish`].
#[derive(Debug)]
pub struct RequestObservation {
    method: Method,
    path: String,
    start: Instant,
}

impl RequestObservation {
    pub fn begin(req: &Request) -> Self {
        let start = Instant::now();
        let path = match req.extensions().get::<MatchedPath>() {
            Some(matched) => matched.as_str().to_owned(),
            None => req.uri().path().to_owned(),
        };
        Self {
            method: req.method().clone(),
            path,
            start,
        }
    }

    pub fn finish(self, metrics: &MetricsService, status: StatusCode) {
        let elapsed = self.start.elapsed();
        let method = self.method.as_str();

        metrics.increment_total_requests(method, &self.path);
        metrics.observe_request_duration(elapsed, method, &self.path);

        if status.as_u16() >= 500 {
            metrics.increment_failed_requests(method, &self.path, status.as_str());
        }
    }
}

pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let observation = RequestObservation::begin(&req);
    let response = next.run(req).await;
    observation.finish(&state.metrics(), response.status());
    response
}
