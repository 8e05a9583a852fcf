//! Service config loader: optional strict YAML file, then environment
//! overrides.
//!
//! | variable | effect |
//! |---|---|
//! | `REQWATCH_CONFIG` | path of a YAML file loaded before overrides |
//! | `PORT` | listen port (empty means default) |
//! | `HOST` | listen address |
//! | `NO_SIGNALS` | any non-empty value disables signal-driven shutdown |
//! | `DEBUG` | `"true"` turns on debug logging |
//! | `SHUTDOWN_TIMEOUT_SECS` | drain deadline |

pub mod schema;

use std::fs;

use reqwatch_core::error::{ReqwatchError, Result};

pub use schema::ServiceConfig;

pub const CONFIG_PATH_ENV: &str = "REQWATCH_CONFIG";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ReqwatchError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| ReqwatchError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config from the process environment.
pub fn from_env() -> Result<ServiceConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Resolve config against an arbitrary variable lookup.
pub fn from_lookup<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        Some(path) => load_from_file(&path)?,
        None => ServiceConfig::default(),
    };

    if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
        cfg.port = port
            .parse()
            .map_err(|e| ReqwatchError::BadRequest(format!("invalid PORT {port:?}: {e}")))?;
    }
    if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
        cfg.host = host;
    }
    if lookup("NO_SIGNALS").is_some_and(|v| !v.is_empty()) {
        cfg.signals = false;
    }
    if let Some(debug) = lookup("DEBUG") {
        cfg.debug = debug == "true";
    }
    if let Some(secs) = lookup("SHUTDOWN_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
        cfg.shutdown_timeout_secs = secs.parse().map_err(|e| {
            ReqwatchError::BadRequest(format!("invalid SHUTDOWN_TIMEOUT_SECS {secs:?}: {e}"))
        })?;
    }

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.signals);
        assert!(!cfg.debug);
        assert_eq!(cfg.shutdown_timeout_secs, 60);
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn env_overrides() {
        let cfg = from_lookup(lookup(&[
            ("PORT", "9090"),
            ("NO_SIGNALS", "1"),
            ("DEBUG", "true"),
            ("SHUTDOWN_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 9090);
        assert!(!cfg.signals);
        assert!(cfg.debug);
        assert_eq!(cfg.shutdown_timeout().as_secs(), 5);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = from_lookup(lookup(&[("PORT", ""), ("NO_SIGNALS", ""), ("DEBUG", "yes")])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.signals);
        assert!(!cfg.debug);
    }

    #[test]
    fn bad_port_is_client_error() {
        let err = from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ReqwatchError::BadRequest(_)));
        let err = from_lookup(lookup(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ReqwatchError::BadRequest(_)));
    }

    #[test]
    fn missing_config_file_is_internal_error() {
        let err = from_lookup(lookup(&[(CONFIG_PATH_ENV, "/nonexistent/reqwatch.yaml")])).unwrap_err();
        assert!(matches!(err, ReqwatchError::Internal(_)));
    }
}
