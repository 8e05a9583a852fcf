//! Process-default metrics served on `/default-metrics`.
//!
//! These live in their own `Registry` so they never collide with the custom
//! request instruments. Every gauge reads the OS or the Tokio runtime at
//! scrape time.

use std::sync::Arc;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use reqwatch_core::error::Result;
use reqwatch_core::metrics::{GaugeFunc, Opts, Registry};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProcessSnapshot {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub start_time_secs: u64,
    pub run_time_secs: u64,
    pub threads: usize,
}

fn refresh(kind: ProcessRefreshKind) -> Option<(System, Pid)> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), true, kind);
    Some((system, pid))
}

/// Resident set size of this process, in bytes.
pub(crate) fn resident_bytes() -> Option<u64> {
    let (system, pid) = refresh(ProcessRefreshKind::nothing().with_memory())?;
    system.process(pid).map(|p| p.memory())
}

pub(crate) fn snapshot() -> Option<ProcessSnapshot> {
    let (system, pid) = refresh(ProcessRefreshKind::everything())?;
    let p = system.process(pid)?;
    Some(ProcessSnapshot {
        resident_bytes: p.memory(),
        virtual_bytes: p.virtual_memory(),
        start_time_secs: p.start_time(),
        run_time_secs: p.run_time(),
        threads: p.tasks().map_or(1, |tasks| tasks.len()),
    })
}

fn process_gauge<F>(name: &str, help: &str, read: F) -> Result<Arc<GaugeFunc>>
where
    F: Fn(&ProcessSnapshot) -> f64 + Send + Sync + 'static,
{
    let gauge = GaugeFunc::new(Opts::new(name, help), move || {
        snapshot().map(|s| read(&s)).unwrap_or(0.0)
    })?;
    Ok(Arc::new(gauge))
}

fn runtime_gauge<F>(name: &str, help: &str, read: F) -> Result<Arc<GaugeFunc>>
where
    F: Fn(&tokio::runtime::RuntimeMetrics) -> usize + Send + Sync + 'static,
{
    let gauge = GaugeFunc::new(Opts::new(name, help), move || {
        tokio::runtime::Handle::try_current()
            .map(|h| read(&h.metrics()) as f64)
            .unwrap_or(0.0)
    })?;
    Ok(Arc::new(gauge))
}

/// Build the process-default registry.
pub fn default_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register(process_gauge(
        "process_resident_memory_bytes",
        "Resident memory size in bytes.",
        |s| s.resident_bytes as f64,
    )?)?;
    registry.register(process_gauge(
        "process_virtual_memory_bytes",
        "Virtual memory size in bytes.",
        |s| s.virtual_bytes as f64,
    )?)?;
    registry.register(process_gauge(
        "process_start_time_seconds",
        "Start time of the process since unix epoch in seconds.",
        |s| s.start_time_secs as f64,
    )?)?;
    registry.register(process_gauge(
        "process_run_time_seconds",
        "Time the process has been running, in seconds.",
        |s| s.run_time_secs as f64,
    )?)?;
    registry.register(process_gauge(
        "process_threads",
        "Number of OS threads in the process.",
        |s| s.threads as f64,
    )?)?;
    registry.register(runtime_gauge(
        "tokio_workers_count",
        "Number of worker threads used by the Tokio runtime.",
        |m| m.num_workers(),
    )?)?;
    registry.register(runtime_gauge(
        "tokio_alive_tasks",
        "Number of alive tasks in the Tokio runtime.",
        |m| m.num_alive_tasks(),
    )?)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_current_process() {
        let s = snapshot().unwrap();
        assert!(s.resident_bytes > 0);
        assert!(s.start_time_secs > 0);
    }

    #[test]
    fn runtime_gauges_are_zero_outside_a_runtime() {
        let reg = default_registry().unwrap();
        let out = reg.gather();
        assert!(out.contains("tokio_workers_count 0\n"));
        assert!(out.contains("# TYPE process_resident_memory_bytes gauge\n"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runtime_gauges_read_the_current_runtime() {
        let reg = default_registry().unwrap();
        assert!(reg.gather().contains("tokio_workers_count 2\n"));
    }
}
