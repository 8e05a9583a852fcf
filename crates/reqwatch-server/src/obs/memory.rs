//! Memory sampler capability.
//!
//! The `app_memory_bytes_usage` gauge is bound to a `MemorySource` at
//! registration time and reads it on every scrape.

use std::sync::atomic::{AtomicU64, Ordering};

use super::process;

/// Something that can report the current live-allocation byte count.
pub trait MemorySource: Send + Sync {
    fn live_bytes(&self) -> u64;
}

/// Resident memory of the current process, re-read from the OS on each call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemory;

impl MemorySource for ProcessMemory {
    fn live_bytes(&self) -> u64 {
        process::resident_bytes().unwrap_or(0)
    }
}

/// Caller-controlled value, for tests and embedders without OS access.
#[derive(Debug, Default)]
pub struct FixedMemory(AtomicU64);

impl FixedMemory {
    pub fn new(bytes: u64) -> Self {
        Self(AtomicU64::new(bytes))
    }

    pub fn set(&self, bytes: u64) {
        self.0.store(bytes, Ordering::Relaxed);
    }
}

impl MemorySource for FixedMemory {
    fn live_bytes(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_memory_is_nonzero() {
        assert!(ProcessMemory.live_bytes() > 0);
    }

    #[test]
    fn fixed_memory_follows_set() {
        let m = FixedMemory::new(10);
        assert_eq!(m.live_bytes(), 10);
        m.set(42);
        assert_eq!(m.live_bytes(), 42);
    }
}
