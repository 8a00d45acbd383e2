//! hitcount service
//!
//! - `GET /hello?name=...` : JSON greeting, counted in the request counter
//! - `GET /metrics`        : text exposition for the scraper
//! - `GET /healthz`, `GET /readyz`

use hitcount_core::error::{HitcountError, Result};
use hitcount_service::{app_state::AppState, config, obs, router, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    obs::logging::init();

    let cfg = config::load()?;
    let listen = cfg.service.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, counter = %state.requests().name(), "hitcount-service starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| HitcountError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal(state))
        .await
        .map_err(|e| HitcountError::Internal(format!("server failed: {e}")))?;

    tracing::info!("hitcount-service stopped");
    Ok(())
}
