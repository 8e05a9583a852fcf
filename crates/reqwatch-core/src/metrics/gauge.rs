use std::fmt::Write;

use super::{format_value, write_header, Collector, Desc, Opts};
use crate::error::Result;

type ReadFn = Box<dyn Fn() -> f64 + Send + Sync>;

/// Gauge whose value is computed by `read` at every scrape. Nothing is cached.
pub struct GaugeFunc {
    desc: Desc,
    read: ReadFn,
}

impl GaugeFunc {
    pub fn new<F>(opts: Opts, read: F) -> Result<Self>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Ok(Self {
            desc: Desc::new(opts, &[])?,
            read: Box::new(read),
        })
    }

    /// Invoke the read function.
    pub fn get(&self) -> f64 {
        (self.read)()
    }
}

impl Collector for GaugeFunc {
    fn desc(&self) -> &Desc {
        &self.desc
    }

    fn encode(&self, out: &mut String) {
        write_header(out, &self.desc, "gauge");
        let _ = writeln!(out, "{} {}", self.desc.name, format_value(self.get()));
    }
}
