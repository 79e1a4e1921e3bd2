//! Periodic full-store sweep of expired rules.
//!
//! Reads evict expired rules only for the context being read; contexts that
//! nobody polls would otherwise keep their expired rules forever.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::app_state::AppState;

/// Spawn the sweep loop. Returns `None` when disabled (`interval_secs == 0`).
pub fn spawn(state: AppState, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("expiry sweep disabled; expired rules are evicted on read only");
        return None;
    }

    tracing::info!(interval_secs, "expiry sweep enabled");
    Some(tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately
        tick.tick().await;

        loop {
            tick.tick().await;
            if state.is_draining() {
                break;
            }
            sweep_once(&state);
        }
    }))
}

/// One sweep pass; records what was evicted.
pub fn sweep_once(state: &AppState) -> usize {
    let purged = state.engine().sweep_expired();
    if purged > 0 {
        state
            .metrics()
            .expired_purged
            .add(&[("path", "sweep")], purged as u64);
    }
    purged
}
