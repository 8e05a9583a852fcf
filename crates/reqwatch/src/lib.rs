//! Top-level facade crate for reqwatch.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use reqwatch_core::*;
}

pub mod server {
    pub use reqwatch_server::*;
}
