//! In-process metric instruments and Prometheus text exposition.
//!
//! Instruments are stored as atomics keyed by label values in a `DashMap`, so
//! any number of request tasks can update them without a global lock. Label
//! arity is part of the type (`CounterVec<2>` takes `[&str; 2]`), which turns a
//! mismatched label tuple into a compile error instead of a runtime one.
//!
//! Rendering follows the text format 0.0.4: `# HELP`, `# TYPE`, then one
//! sample line per series, series sorted by label values.

pub mod counter;
pub mod gauge;
pub mod histogram;
pub mod registry;

pub use counter::CounterVec;
pub use gauge::GaugeFunc;
pub use histogram::{HistogramVec, DEFAULT_BUCKETS};
pub use registry::Registry;

use std::fmt::Write;

use crate::error::{ReqwatchError, Result};

/// Content type served by scrape endpoints.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Name and help text shared by every instrument.
#[derive(Debug, Clone)]
pub struct Opts {
    pub name: String,
    pub help: String,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self { name: name.into(), help: help.into() }
    }
}

/// Validated identity of a metric family.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub label_names: Vec<&'static str>,
}

impl Desc {
    pub fn new(opts: Opts, label_names: &[&'static str]) -> Result<Self> {
        if !is_valid_metric_name(&opts.name) {
            return Err(ReqwatchError::InvalidMetric(format!(
                "invalid metric name: {:?}",
                opts.name
            )));
        }
        if opts.help.is_empty() {
            return Err(ReqwatchError::InvalidMetric(format!(
                "metric {} has empty help",
                opts.name
            )));
        }
        for (i, l) in label_names.iter().enumerate() {
            if !is_valid_label_name(l) {
                return Err(ReqwatchError::InvalidMetric(format!(
                    "metric {} has invalid label name: {:?}",
                    opts.name, l
                )));
            }
            if label_names[..i].contains(l) {
                return Err(ReqwatchError::InvalidMetric(format!(
                    "metric {} repeats label name: {}",
                    opts.name, l
                )));
            }
        }
        Ok(Self {
            name: opts.name,
            help: opts.help,
            label_names: label_names.to_vec(),
        })
    }
}

/// A metric family that can be registered and rendered.
pub trait Collector: Send + Sync {
    fn desc(&self) -> &Desc;

    /// Append this family (header and samples) to `out`.
    fn encode(&self, out: &mut String);
}

pub(crate) fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub(crate) fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Helper to escape label values.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub(crate) fn write_header(out: &mut String, desc: &Desc, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", desc.name, escape_help(&desc.help));
    let _ = writeln!(out, "# TYPE {} {}", desc.name, kind);
}

/// `k1="v1",k2="v2"` for one series (no braces).
pub(crate) fn label_pairs(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Sample value rendering; infinities use the `+Inf`/`-Inf` spelling.
pub(crate) fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".to_string() } else { "-Inf".to_string() }
    } else {
        v.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metric_names() {
        assert!(is_valid_metric_name("http_requests_total"));
        assert!(is_valid_metric_name("ns:sub_total"));
        assert!(!is_valid_metric_name("9lives"));
        assert!(!is_valid_metric_name("has-dash"));
        assert!(!is_valid_metric_name(""));
    }

    #[test]
    fn label_names() {
        assert!(is_valid_label_name("status_code"));
        assert!(!is_valid_label_name("__reserved"));
        assert!(!is_valid_label_name("a:b"));
    }

    #[test]
    fn desc_rejects_repeated_labels() {
        let err = Desc::new(Opts::new("x_total", "x"), &["path", "path"]).unwrap_err();
        assert!(matches!(err, ReqwatchError::InvalidMetric(_)));
    }

    #[test]
    fn escapes_label_values() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }

    #[test]
    fn formats_special_values() {
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(0.005), "0.005");
        assert_eq!(format_value(10.0), "10");
    }
}
