//! OS termination signals as a shutdown source.

use std::io;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
pub async fn termination() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("received SIGINT");
            }
            _ = terminate.recv() => {
                tracing::info!("received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("received Ctrl+C");
    }

    Ok(())
}

/// Cancel `token` on the first termination signal. The task also exits if
/// the token is cancelled by someone else first.
pub fn spawn_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = termination() => match res {
                Ok(()) => {
                    tracing::info!("signal received, starting graceful shutdown");
                    token.cancel();
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to install signal handlers, shutdown signals are ignored");
                }
            },
            _ = token.cancelled() => {}
        }
    })
}
