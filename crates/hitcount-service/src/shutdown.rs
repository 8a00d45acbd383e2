//! Graceful shutdown.
//!
//! On Ctrl-C or SIGTERM the state flips to draining (readyz answers 503) and
//! the listener stays open for `service.shutdown_grace_ms` so a last scrape
//! can still read `/metrics`.

use tokio::time::Duration;

use crate::app_state::AppState;

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Resolves once the server should stop accepting connections.
pub async fn shutdown_signal(state: AppState) {
    wait_for_signal().await;

    let grace = Duration::from_millis(state.cfg().service.shutdown_grace_ms);
    state.set_draining();
    tracing::info!(grace_ms = %grace.as_millis(), "shutdown requested, draining");

    tokio::time::sleep(grace).await;
}
