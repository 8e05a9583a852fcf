use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{label_pairs, write_header, Collector, Desc, Opts};
use crate::error::Result;

/// Monotonic counter family keyed by `N` label values.
///
/// Series are created lazily at zero on first update.
pub struct CounterVec<const N: usize> {
    desc: Desc,
    map: DashMap<[String; N], AtomicU64>,
}

impl<const N: usize> CounterVec<N> {
    pub fn new(opts: Opts, label_names: [&'static str; N]) -> Result<Self> {
        Ok(Self {
            desc: Desc::new(opts, &label_names)?,
            map: DashMap::new(),
        })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: [&str; N]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: [&str; N], v: u64) {
        let key = labels.map(str::to_owned);
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value of one series (0 if it was never touched).
    pub fn get(&self, labels: [&str; N]) -> u64 {
        self.map
            .get(&labels.map(str::to_owned))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of distinct label series seen so far.
    pub fn series_count(&self) -> usize {
        self.map.len()
    }
}

impl<const N: usize> Collector for CounterVec<N> {
    fn desc(&self) -> &Desc {
        &self.desc
    }

    fn encode(&self, out: &mut String) {
        write_header(out, &self.desc, "counter");

        let mut rows: Vec<([String; N], u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, val) in rows {
            let label_str = label_pairs(&self.desc.label_names, &key);
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", self.desc.name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", self.desc.name, label_str, val);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn requests() -> CounterVec<2> {
        CounterVec::new(Opts::new("requests_total", "Requests"), ["method", "path"]).unwrap()
    }

    #[test]
    fn series_start_at_zero() {
        let c = requests();
        assert_eq!(c.get(["GET", "/"]), 0);
        c.inc(["GET", "/"]);
        c.add(["GET", "/"], 4);
        assert_eq!(c.get(["GET", "/"]), 5);
        assert_eq!(c.get(["POST", "/"]), 0);
        assert_eq!(c.series_count(), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let c = Arc::new(requests());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        c.inc(["GET", "/ping"]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.get(["GET", "/ping"]), 8000);
    }

    #[test]
    fn renders_sorted_series() {
        let c = requests();
        c.inc(["POST", "/video"]);
        c.inc(["GET", "/"]);
        let mut out = String::new();
        c.encode(&mut out);
        assert_eq!(
            out,
            "# HELP requests_total Requests\n\
             # TYPE requests_total counter\n\
             requests_total{method=\"GET\",path=\"/\"} 1\n\
             requests_total{method=\"POST\",path=\"/video\"} 1\n"
        );
    }

    #[test]
    fn unlabelled_counter_has_no_braces() {
        let c = CounterVec::new(Opts::new("events_total", "Events"), []).unwrap();
        c.inc([]);
        let mut out = String::new();
        c.encode(&mut out);
        assert!(out.ends_with("events_total 1\n"));
    }
}
