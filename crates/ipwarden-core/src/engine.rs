use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, WardenError};
use crate::rule::{Action, Rule, RuleCandidate};
use crate::safety::SafetyGuard;
use crate::store::{MemoryRuleStore, RuleStore};

/// Allow/block projection of a context's live rules, as polled by the WAF.
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    pub context: String,
    pub allow_list: Vec<String>,
    pub block_list: Vec<String>,
    pub rule_count: usize,
    pub generated_at: DateTime<Utc>,
    /// Expired rules evicted while building this projection.
    #[serde(skip)]
    pub purged: usize,
}

/// Policy engine: the only entry point for callers.
/// Construct once at startup, then share via Arc.
pub struct PolicyEngine {
    guard: SafetyGuard,
    store: Arc<dyn RuleStore>,
    clock: Arc<dyn Clock>,
}

impl PolicyEngine {
    /// In-memory store, real clock.
    pub fn new(guard: SafetyGuard) -> Self {
        Self::with_parts(guard, Arc::new(MemoryRuleStore::new()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        guard: SafetyGuard,
        store: Arc<dyn RuleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard,
            store,
            clock,
        }
    }

    pub fn safety_guard(&self) -> &SafetyGuard {
        &self.guard
    }

    /// Total stored rules, including expired ones not yet evicted.
    pub fn stored_rules(&self) -> usize {
        self.store.len()
    }

    /// Validate, check the safety net, then upsert.
    /// Every failure returns before the store is touched.
    pub fn add_rule(&self, candidate: &RuleCandidate) -> Result<Rule> {
        let validated = candidate.validate().map_err(|e| {
            debug!(context = %candidate.context, ip = %candidate.ip, error = %e, "rule rejected");
            e
        })?;

        if validated.action == Action::Block {
            if let Some(range) = self.guard.covering_range(validated.ip) {
                warn!(
                    context = %validated.context,
                    ip = %validated.ip,
                    %range,
                    "refusing to block protected address"
                );
                return Err(WardenError::SafetyViolation {
                    ip: validated.ip,
                    range,
                });
            }
        }

        let rule = validated.into_rule(self.clock.now())?;
        let stored = self.store.upsert(rule);

        info!(
            context = %stored.context,
            ip = %stored.ip,
            action = stored.action.as_str(),
            expires_at = ?stored.expires_at,
            "rule stored"
        );
        Ok(stored)
    }

    /// Live rules for `context`; expired ones are evicted on the way.
    pub fn active_rules(&self, context: &str) -> Vec<Rule> {
        self.scan(context).0
    }

    pub fn get_configuration(&self, context: &str) -> Configuration {
        let (active, purged, now) = self.scan(context);

        let rule_count = active.len();
        let mut allow_list = Vec::new();
        let mut block_list = Vec::new();
        for rule in active {
            match rule.action {
                Action::Allow => allow_list.push(rule.ip.to_string()),
                Action::Block => block_list.push(rule.ip.to_string()),
            }
        }

        Configuration {
            context: context.to_string(),
            allow_list,
            block_list,
            rule_count,
            generated_at: now,
            purged,
        }
    }

    /// Remove the rule for `(context, ip)`. An address that does not parse
    /// cannot key a rule, so it reports `NotFound` as well.
    pub fn remove_rule(&self, context: &str, ip: &str) -> Result<()> {
        let not_found = || WardenError::NotFound {
            context: context.to_string(),
            ip: ip.to_string(),
        };

        let addr: IpAddr = ip.parse().map_err(|_| not_found())?;
        if !self.store.remove(context, addr) {
            return Err(not_found());
        }

        info!(%context, ip = %addr, "rule removed");
        Ok(())
    }

    /// Evict expired rules from every context, queried or not.
    pub fn sweep_expired(&self) -> usize {
        let purged = self.store.purge_expired(self.clock.now());
        if purged > 0 {
            info!(purged, "expired rules swept");
        }
        purged
    }

    fn scan(&self, context: &str) -> (Vec<Rule>, usize, DateTime<Utc>) {
        let now = self.clock.now();
        let outcome = self.store.scan_active(context, now);
        if outcome.purged > 0 {
            debug!(%context, purged = outcome.purged, "expired rules evicted on read");
        }
        (outcome.active, outcome.purged, now)
    }
}
