//! ipwarden gateway
//!
//! Control plane for WAF IP policy:
//! - `POST /ips`, `DELETE /ips/:context/:ip` manage rules
//! - `GET /waf/config/:context` is polled by the enforcement point
//! - periodic sweep of expired rules, graceful drain on Ctrl-C
//!
//! Config path comes from `IPWARDEN_CONFIG` (default `ipwarden.yaml`).

use tracing_subscriber::{fmt, EnvFilter};

use ipwarden_core::error::{Result, WardenError};
use ipwarden_gateway::{app_state, config, ops, router};

const DEFAULT_CONFIG_PATH: &str = "ipwarden.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ipwarden=info".into()),
        )
        .init();

    let path = std::env::var("IPWARDEN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;
    let sweep_interval_secs = cfg.expiry.sweep_interval_secs;

    let state = app_state::AppState::new(cfg)?;
    let sweeper = ops::sweeper::spawn(state.clone(), sweep_interval_secs);
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "ipwarden-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| WardenError::Internal(format!("bind {listen} failed: {e}")))?;

    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested; draining");
            drain.set_draining();
        })
        .await
        .map_err(|e| WardenError::Internal(format!("server failed: {e}")))?;

    if let Some(task) = sweeper {
        task.abort();
    }
    tracing::info!("ipwarden-gateway stopped");
    Ok(())
}
