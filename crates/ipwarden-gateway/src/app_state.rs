//! Shared application state for the ipwarden gateway.
//!
//! The policy engine is built here from config and owned by the state; every
//! handler reaches it through a cheap `AppState` clone. There is no global.

use std::sync::Arc;

use ipwarden_core::error::Result;
use ipwarden_core::{PolicyEngine, SafetyGuard};

use crate::config::GatewayConfig;
use crate::obs::WardenMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    engine: Arc<PolicyEngine>,
    metrics: WardenMetrics,
}

impl AppState {
    /// Build state with an in-memory engine guarded by the configured ranges.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let extra = cfg.safety.parsed_ranges()?;
        let guard = SafetyGuard::with_extra_ranges(extra);

        tracing::info!(
            protected_ranges = guard.ranges().len(),
            "safety net initialised"
        );

        Ok(Self::with_engine(cfg, Arc::new(PolicyEngine::new(guard))))
    }

    /// Build state around an existing engine (custom store or clock).
    pub fn with_engine(cfg: GatewayConfig, engine: Arc<PolicyEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                engine,
                metrics: WardenMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.inner.engine
    }

    pub fn metrics(&self) -> &WardenMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Gauge lines appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![("ipwarden_rules_stored", self.engine().stored_rules() as u64)]
    }
}
