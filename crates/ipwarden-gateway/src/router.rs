//! Axum router wiring.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::http};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::root))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/ips", post(http::add_rule))
        .route("/ips/:context", get(http::list_rules))
        .route("/ips/:context/:ip", delete(http::remove_rule))
        .route("/waf/config/:context", get(http::waf_config))
        .with_state(state)
}
