//! reqwatch server library entry.
//!
//! Wires the metrics service, instrumentation middleware, scrape endpoints,
//! built-in handlers, and the lifecycle coordinator into one HTTP service. It
//! is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod http_error;
pub mod lifecycle;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
