//! Named collection of metric families.
//!
//! A `Registry` is built with `&mut self` and then shared behind an `Arc`, so
//! the set of families is fixed once traffic starts; only instrument values
//! keep changing.

use std::collections::HashSet;
use std::sync::Arc;

use super::Collector;
use crate::error::{ReqwatchError, Result};

#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family. A name that is already registered is rejected and the
    /// existing family is left untouched.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.desc().name.clone();
        if !self.names.insert(name.clone()) {
            return Err(ReqwatchError::AlreadyRegistered(name));
        }
        tracing::debug!(metric = %name, "metric registered");
        self.collectors.push(collector);
        Ok(())
    }

    /// Register several families, stopping at the first failure.
    pub fn register_all<I>(&mut self, collectors: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Collector>>,
    {
        for c in collectors {
            self.register(c)?;
        }
        Ok(())
    }

    /// Family names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.desc().name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Point-in-time text snapshot of every family, in registration order.
    pub fn gather(&self) -> String {
        let mut out = String::new();
        for c in &self.collectors {
            c.encode(&mut out);
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metrics::{CounterVec, GaugeFunc, Opts};

    #[test]
    fn duplicate_name_is_rejected() {
        let mut reg = Registry::new();
        let a = Arc::new(CounterVec::new(Opts::new("dup_total", "first"), ["path"]).unwrap());
        let b = Arc::new(GaugeFunc::new(Opts::new("dup_total", "second"), || 1.0).unwrap());

        reg.register(a).unwrap();
        let err = reg.register(b).unwrap_err();
        assert!(matches!(err, ReqwatchError::AlreadyRegistered(ref n) if n == "dup_total"));
        assert_eq!(reg.len(), 1);
        assert!(reg.gather().contains("# HELP dup_total first\n"));
    }

    #[test]
    fn gather_follows_registration_order() {
        let mut reg = Registry::new();
        reg.register(Arc::new(GaugeFunc::new(Opts::new("zeta", "z"), || 0.0).unwrap()))
            .unwrap();
        reg.register(Arc::new(GaugeFunc::new(Opts::new("alpha", "a"), || 0.0).unwrap()))
            .unwrap();
        assert_eq!(reg.names(), vec!["zeta", "alpha"]);

        let out = reg.gather();
        let zeta = out.find("# HELP zeta").unwrap();
        let alpha = out.find("# HELP alpha").unwrap();
        assert!(zeta < alpha);
    }
}
