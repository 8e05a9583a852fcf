//! Request metrics service.
//!
//! Owns the custom registry behind `/metrics`: total and failed request
//! counters, the request duration histogram, and the memory gauge. Built once
//! at startup and shared with the middleware through `AppState`.

use std::sync::Arc;
use std::time::Duration;

use reqwatch_core::error::Result;
use reqwatch_core::metrics::{CounterVec, GaugeFunc, HistogramVec, Opts, Registry};

use super::memory::MemorySource;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUESTS_ERRORS_TOTAL: &str = "http_requests_errors_total";
pub const HTTP_REQUESTS_DURATION_SECONDS: &str = "http_requests_duration_seconds";
pub const APP_MEMORY_BYTES_USAGE: &str = "app_memory_bytes_usage";

pub struct MetricsService {
    registry: Registry,
    total_requests: Arc<CounterVec<2>>,     // method, path
    failed_requests: Arc<CounterVec<3>>,    // method, path, status_code
    request_duration: Arc<HistogramVec<2>>, // path, method
    memory: Arc<dyn MemorySource>,
}

impl MetricsService {
    /// Build the instruments and register them. Fails if any name is
    /// already taken in the registry.
    pub fn new(memory: Arc<dyn MemorySource>) -> Result<Self> {
        let total_requests = Arc::new(CounterVec::new(
            Opts::new(HTTP_REQUESTS_TOTAL, "Number of http requests"),
            ["method", "path"],
        )?);
        let failed_requests = Arc::new(CounterVec::new(
            Opts::new(HTTP_REQUESTS_ERRORS_TOTAL, "Number of failed http requests"),
            ["method", "path", "status_code"],
        )?);
        let request_duration = Arc::new(HistogramVec::new(
            Opts::new(HTTP_REQUESTS_DURATION_SECONDS, "Duration of http requests"),
            ["path", "method"],
        )?);
        let sampler = Arc::clone(&memory);
        let memory_usage = Arc::new(GaugeFunc::new(
            Opts::new(APP_MEMORY_BYTES_USAGE, "Memory usage of the application"),
            move || sampler.live_bytes() as f64,
        )?);

        let mut registry = Registry::new();
        registry.register(total_requests.clone())?;
        registry.register(failed_requests.clone())?;
        registry.register(request_duration.clone())?;
        registry.register(memory_usage)?;

        Ok(Self {
            registry,
            total_requests,
            failed_requests,
            request_duration,
            memory,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn increment_total_requests(&self, method: &str, path: &str) {
        self.total_requests.inc([method, path]);
    }

    pub fn increment_failed_requests(&self, method: &str, path: &str, status_code: &str) {
        self.failed_requests.inc([method, path, status_code]);
    }

    pub fn observe_request_duration(&self, duration: Duration, method: &str, path: &str) {
        let secs = duration.as_secs_f64();
        tracing::debug!(duration = secs, %method, %path, "observing request duration");
        self.request_duration.observe([path, method], secs);
    }

    /// Current live-allocation bytes, read straight from the sampler.
    pub fn sample_memory(&self) -> u64 {
        self.memory.live_bytes()
    }

    /// Text snapshot of every instrument, in registration order.
    pub fn export(&self) -> String {
        self.registry.gather()
    }

    pub fn total_requests(&self, method: &str, path: &str) -> u64 {
        self.total_requests.get([method, path])
    }

    pub fn failed_requests(&self, method: &str, path: &str, status_code: &str) -> u64 {
        self.failed_requests.get([method, path, status_code])
    }

    pub fn failed_series(&self) -> usize {
        self.failed_requests.series_count()
    }

    pub fn duration_samples(&self, method: &str, path: &str) -> u64 {
        self.request_duration.sample_count([path, method])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obs::FixedMemory;

    fn service(bytes: u64) -> (MetricsService, Arc<FixedMemory>) {
        let mem = Arc::new(FixedMemory::new(bytes));
        let svc = MetricsService::new(mem.clone()).unwrap();
        (svc, mem)
    }

    #[test]
    fn registers_four_instruments_in_order() {
        let (svc, _) = service(0);
        assert_eq!(
            svc.registry().names(),
            vec![
                HTTP_REQUESTS_TOTAL,
                HTTP_REQUESTS_ERRORS_TOTAL,
                HTTP_REQUESTS_DURATION_SECONDS,
                APP_MEMORY_BYTES_USAGE
            ]
        );
    }

    #[test]
    fn memory_gauge_is_pulled_at_export() {
        let (svc, mem) = service(1024);
        assert!(svc.export().contains("app_memory_bytes_usage 1024\n"));
        mem.set(4096);
        assert_eq!(svc.sample_memory(), 4096);
        assert!(svc.export().contains("app_memory_bytes_usage 4096\n"));
    }

    #[test]
    fn export_does_not_touch_counters() {
        let (svc, _) = service(0);
        svc.increment_total_requests("GET", "/ping");
        svc.observe_request_duration(Duration::ZERO, "GET", "/ping");
        let _ = svc.export();
        let _ = svc.export();
        assert_eq!(svc.total_requests("GET", "/ping"), 1);
        assert_eq!(svc.duration_samples("GET", "/ping"), 1);
    }

    #[test]
    fn histogram_labels_are_path_then_method() {
        let (svc, _) = service(0);
        svc.observe_request_duration(Duration::from_millis(3), "GET", "/ping");
        assert!(svc.export().contains(
            "http_requests_duration_seconds_count{path=\"/ping\",method=\"GET\"} 1\n"
        ));
    }
}
