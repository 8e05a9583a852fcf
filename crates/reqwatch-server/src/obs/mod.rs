//! Request observability: the custom metrics service, the memory sampler it
//! pulls from, and the process-default collector behind `/default-metrics`.

pub mod memory;
pub mod metrics;
pub mod process;

pub use memory::{FixedMemory, MemorySource, ProcessMemory};
pub use metrics::MetricsService;
