//! Serve / shutdown coordination.
//!
//! `Idle -> Serving -> Draining -> Stopped`. The listener runs on its own task;
//! the coordinator selects on that task and a shutdown `CancellationToken`.
//! Cancelling the token stops accepting connections and starts a drain bounded
//! by `shutdown_timeout`. If nobody ever cancels the token (signals disabled)
//! the coordinator stays in `Serving` until the listener fails or the process
//! is killed.

pub mod signal;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    Serving,
    Draining,
    Stopped,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Serving => write!(f, "Serving"),
            Self::Draining => write!(f, "Draining"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Fatal lifecycle outcomes. All of them end the process with a nonzero code.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("HTTP server error: {0}")]
    Listener(#[source] io::Error),
    #[error("HTTP server stopped without a shutdown request")]
    ListenerExited,
    #[error("HTTP server task failed: {0}")]
    TaskFailed(String),
    #[error("HTTP shutdown error: in-flight requests still running after {0:?}")]
    ShutdownTimeout(Duration),
}

type ServerTask = JoinHandle<io::Result<()>>;

pub struct Coordinator {
    shutdown_timeout: Duration,
    token: CancellationToken,
    phase: watch::Sender<LifecyclePhase>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(DEFAULT_SHUTDOWN_TIMEOUT)
    }
}

impl Coordinator {
    pub fn new(shutdown_timeout: Duration) -> Self {
        let (phase, _) = watch::channel(LifecyclePhase::Idle);
        Self {
            shutdown_timeout,
            token: CancellationToken::new(),
            phase,
        }
    }

    /// Token whose cancellation requests a graceful shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.subscribe()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    fn enter(&self, next: LifecyclePhase) {
        let prev = self.phase.send_replace(next);
        tracing::debug!(from = %prev, to = %next, "lifecycle transition");
    }

    pub async fn bind(&self, addr: SocketAddr) -> Result<TcpListener, LifecycleError> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| LifecycleError::Bind { addr, source })
    }

    /// Bind `addr` and serve `app` until shutdown completes.
    pub async fn run(&self, addr: SocketAddr, app: Router) -> Result<(), LifecycleError> {
        let listener = self.bind(addr).await?;
        self.serve(listener, app).await
    }

    /// Serve on an already bound listener until shutdown completes.
    pub async fn serve(&self, listener: TcpListener, app: Router) -> Result<(), LifecycleError> {
        let local_addr = listener.local_addr().ok();
        let token = self.token.clone();
        let mut server: ServerTask = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
        });
        self.enter(LifecyclePhase::Serving);
        tracing::info!(addr = ?local_addr, "listening");

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {}
            res = &mut server => {
                // the listener ended on its own; that is only fine if a
                // shutdown was requested at the same moment
                self.enter(LifecyclePhase::Stopped);
                let res = flatten(res);
                if self.token.is_cancelled() {
                    return res;
                }
                let err = res.err().unwrap_or(LifecycleError::ListenerExited);
                tracing::error!(error = %err, "listener failed while serving");
                return Err(err);
            }
        }

        self.drain(server).await
    }

    async fn drain(&self, mut server: ServerTask) -> Result<(), LifecycleError> {
        self.enter(LifecyclePhase::Draining);
        tracing::info!(timeout = ?self.shutdown_timeout, "stopped accepting connections, draining in-flight requests");

        match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
            Ok(res) => {
                self.enter(LifecyclePhase::Stopped);
                let res = flatten(res);
                match &res {
                    Ok(()) => tracing::info!("Graceful shutdown complete."),
                    Err(e) => tracing::error!(error = %e, "listener failed while draining"),
                }
                res
            }
            Err(_) => {
                server.abort();
                self.enter(LifecyclePhase::Stopped);
                let err = LifecycleError::ShutdownTimeout(self.shutdown_timeout);
                tracing::error!(error = %err, "forced termination, abandoning in-flight requests");
                Err(err)
            }
        }
    }
}

fn flatten(res: Result<io::Result<()>, JoinError>) -> Result<(), LifecycleError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LifecycleError::Listener(e)),
        Err(e) => Err(LifecycleError::TaskFailed(e.to_string())),
    }
}
