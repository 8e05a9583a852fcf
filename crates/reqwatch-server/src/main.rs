//! reqwatch server
//!
//! - Request metrics on `/metrics`, process gauges on `/default-metrics`
//! - Config from `REQWATCH_CONFIG` (optional YAML) plus environment overrides
//! - Graceful shutdown on SIGINT/SIGTERM unless `NO_SIGNALS` is set

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use reqwatch_server::{app_state, config, lifecycle, obs, router};

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = config::from_env();
    init_tracing(cfg.as_ref().is_ok_and(|c| c.debug));

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    let listen = match cfg.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    let state = match app_state::AppState::new(Arc::new(obs::ProcessMemory)) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "metrics registration failed");
            return ExitCode::FAILURE;
        }
    };
    let app = router::build_router(state);

    let coordinator = lifecycle::Coordinator::new(cfg.shutdown_timeout());
    if cfg.signals {
        lifecycle::signal::spawn_watcher(coordinator.shutdown_token());
    } else {
        tracing::info!("signal handling disabled, serving in the foreground");
    }

    tracing::info!(%listen, "reqwatch-server starting");
    match coordinator.run(listen, app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "reqwatch-server terminated");
            ExitCode::FAILURE
        }
    }
}
