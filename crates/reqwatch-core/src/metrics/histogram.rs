use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{format_value, label_pairs, write_header, Collector, Desc, Opts};
use crate::error::{ReqwatchError, Result};

/// Default bucket upper bounds, in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

struct AtomicHistogram {
    count: AtomicU64,
    // f64 bits
    sum: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Histogram family keyed by `N` label values.
pub struct HistogramVec<const N: usize> {
    desc: Desc,
    bounds: Vec<f64>,
    map: DashMap<[String; N], AtomicHistogram>,
}

impl<const N: usize> HistogramVec<N> {
    /// Histogram with [`DEFAULT_BUCKETS`].
    pub fn new(opts: Opts, label_names: [&'static str; N]) -> Result<Self> {
        Self::with_buckets(opts, label_names, &DEFAULT_BUCKETS)
    }

    /// Bounds must be strictly increasing; a trailing `+Inf` is implied and
    /// dropped if given.
    pub fn with_buckets(
        opts: Opts,
        label_names: [&'static str; N],
        bounds: &[f64],
    ) -> Result<Self> {
        let desc = Desc::new(opts, &label_names)?;
        let mut bounds = bounds.to_vec();
        if bounds.last() == Some(&f64::INFINITY) {
            bounds.pop();
        }
        if bounds.is_empty() {
            return Err(ReqwatchError::InvalidMetric(format!(
                "histogram {} needs at least one bucket",
                desc.name
            )));
        }
        if bounds.iter().any(|b| !b.is_finite()) || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ReqwatchError::InvalidMetric(format!(
                "histogram {} buckets must be finite and strictly increasing",
                desc.name
            )));
        }
        Ok(Self { desc, bounds, map: DashMap::new() })
    }

    /// Record one sample (seconds). Zero and arbitrarily large values are
    /// accepted; values above the last bound land only in `+Inf`.
    pub fn observe(&self, labels: [&str; N], v: f64) {
        let key = labels.map(str::to_owned);
        if let Some(hist) = self.map.get(&key) {
            self.record(&hist, v);
            return;
        }
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.bounds.len()));
        self.record(&hist, v);
    }

    fn record(&self, hist: &AtomicHistogram, v: f64) {
        hist.count.fetch_add(1, Ordering::Relaxed);
        let _ = hist
            .sum
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + v).to_bits())
            });

        // Cumulative buckets: increment every bucket whose bound covers v.
        for (i, &b) in self.bounds.iter().enumerate() {
            if v <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of samples recorded for one series.
    pub fn sample_count(&self, labels: [&str; N]) -> u64 {
        self.map
            .get(&labels.map(str::to_owned))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of samples recorded for one series.
    pub fn sample_sum(&self, labels: [&str; N]) -> f64 {
        self.map
            .get(&labels.map(str::to_owned))
            .map(|h| f64::from_bits(h.sum.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    pub fn series_count(&self) -> usize {
        self.map.len()
    }
}

impl<const N: usize> Collector for HistogramVec<N> {
    fn desc(&self) -> &Desc {
        &self.desc
    }

    fn encode(&self, out: &mut String) {
        write_header(out, &self.desc, "histogram");
        let name = &self.desc.name;

        let mut keys: Vec<[String; N]> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();

        for key in keys {
            let Some(hist) = self.map.get(&key) else { continue };

            let label_str = label_pairs(&self.desc.label_names, &key);
            let prefix = if label_str.is_empty() { String::new() } else { format!("{},", label_str) };
            let braces = if label_str.is_empty() { String::new() } else { format!("{{{}}}", label_str) };

            for (i, &le) in self.bounds.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, format_value(le), count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = f64::from_bits(hist.sum.load(Ordering::Relaxed));
            let _ = writeln!(out, "{}_sum{} {}", name, braces, format_value(sum));
            let _ = writeln!(out, "{}_count{} {}", name, braces, count);
        }
    }
}
