//! reqwatch core: transport-agnostic metric primitives, the instrument
//! registry, and the shared error type.
//!
//! This crate carries no HTTP or runtime dependencies so the instruments can
//! be updated from any number of request tasks and rendered by whatever
//! scrape surface the server exposes.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Registration problems surface as `ReqwatchError` so the binary decides how
//! to halt.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{ErrorClass, ReqwatchError, Result};
