//! Shared application state for the reqwatch server.
//!
//! Holds the request metrics service and the process-default registry. Both
//! are built once here; the router hands clones of this handle to the
//! middleware and the scrape endpoints.

use std::sync::Arc;

use reqwatch_core::error::Result;
use reqwatch_core::metrics::Registry;

use crate::obs::{process, MemorySource, MetricsService};

#[derive(Clone)]
pub struct AppState {
    metrics: Arc<MetricsService>,
    default_metrics: Arc<Registry>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report registration errors and exit.
    pub fn new(memory: Arc<dyn MemorySource>) -> Result<Self> {
        let metrics = MetricsService::new(memory)?;
        let default_metrics = process::default_registry()?;
        Ok(Self {
            metrics: Arc::new(metrics),
            default_metrics: Arc::new(default_metrics),
        })
    }

    pub fn metrics(&self) -> Arc<MetricsService> {
        Arc::clone(&self.metrics)
    }

    pub fn default_metrics(&self) -> Arc<Registry> {
        Arc::clone(&self.default_metrics)
    }
}
