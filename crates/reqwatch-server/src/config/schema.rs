use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use reqwatch_core::error::{ReqwatchError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Drain on SIGINT/SIGTERM. When false the listener runs in the
    /// foreground until the process is killed.
    #[serde(default = "default_signals")]
    pub signals: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            signals: default_signals(),
            debug: false,
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ReqwatchError::BadRequest("port must be nonzero".into()));
        }
        if self.host.parse::<IpAddr>().is_err() {
            return Err(ReqwatchError::BadRequest(format!(
                "host must be an IP address, got {:?}",
                self.host
            )));
        }
        if !(1..=600).contains(&self.shutdown_timeout_secs) {
            return Err(ReqwatchError::BadRequest(
                "shutdown_timeout_secs must be between 1 and 600".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ReqwatchError::BadRequest(format!("invalid host: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_signals() -> bool {
    true
}
fn default_shutdown_timeout_secs() -> u64 {
    60
}
