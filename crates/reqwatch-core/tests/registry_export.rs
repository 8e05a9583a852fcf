//! Registry snapshot behaviour across families.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use reqwatch_core::metrics::{CounterVec, GaugeFunc, HistogramVec, Opts, Registry};

fn structure(snapshot: &str) -> Vec<String> {
    // drop sample values, keep names + labels
    snapshot
        .lines()
        .map(|l| match l.rsplit_once(' ') {
            Some((head, _)) if !l.starts_with('#') => head.to_string(),
            _ => l.to_string(),
        })
        .collect()
}

#[test]
fn gather_is_structurally_stable_and_read_only() {
    let hits = Arc::new(CounterVec::new(Opts::new("hits_total", "Hits"), ["method", "path"]).unwrap());
    let lat = Arc::new(HistogramVec::new(Opts::new("lat_seconds", "Latency"), ["path", "method"]).unwrap());
    let mut reg = Registry::new();
    reg.register(hits.clone()).unwrap();
    reg.register(lat.clone()).unwrap();
    reg.register(Arc::new(
        GaugeFunc::new(Opts::new("mem_bytes", "Memory"), || 1024.0).unwrap(),
    ))
    .unwrap();

    hits.inc(["GET", "/a"]);
    hits.inc(["GET", "/b"]);
    lat.observe(["/a", "GET"], 0.01);

    let first = reg.gather();
    let second = reg.gather();
    assert_eq!(first, second);
    assert_eq!(hits.get(["GET", "/a"]), 1);
    assert_eq!(lat.sample_count(["/a", "GET"]), 1);

    hits.inc(["GET", "/a"]);
    let third = reg.gather();
    assert_ne!(first, third);
    assert_eq!(structure(&first), structure(&third));
    assert!(third.contains("hits_total{method=\"GET\",path=\"/a\"} 2\n"));
    assert!(third.contains("mem_bytes 1024\n"));
}

#[test]
fn label_values_are_escaped() {
    let c = Arc::new(CounterVec::new(Opts::new("odd_total", "Odd paths"), ["path"]).unwrap());
    let mut reg = Registry::new();
    reg.register(c.clone()).unwrap();
    c.inc(["/say\"hi\""]);
    assert!(reg.gather().contains("odd_total{path=\"/say\\\"hi\\\"\"} 1\n"));
}
