//! Rule storage keyed by (context, ip).
//!
//! `RuleStore` is the seam for swapping backends (KV cache, database). The
//! store performs no validation: whatever it is given, it keeps. Expiration is
//! applied lazily by `scan_active`, and globally by `purge_expired`.
//!
//! `MemoryRuleStore` shards by context through `DashMap`, so every mutation of
//! a context's rules (upsert, remove, purge-on-scan) runs under that context's
//! shard lock and never interleaves with another on the same key.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::expiry::is_expired;
use crate::rule::Rule;

/// Result of a per-context scan.
#[derive(Debug, Default, Clone)]
pub struct ScanOutcome {
    /// Live rules, in insertion order.
    pub active: Vec<Rule>,
    /// Expired rules deleted during the scan.
    pub purged: usize,
}

/// Keyed rule storage.
pub trait RuleStore: Send + Sync {
    /// Store or fully replace the rule for `(rule.context, rule.ip)`.
    fn upsert(&self, rule: Rule) -> Rule;

    /// Live rules of `context` as of `now`; expired ones found are deleted.
    fn scan_active(&self, context: &str, now: DateTime<Utc>) -> ScanOutcome;

    /// Delete the exact key. Returns whether something was removed.
    fn remove(&self, context: &str, ip: IpAddr) -> bool;

    /// Delete every expired rule in every context. Returns how many went.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    /// Stored rules across all contexts, expired-but-unpurged included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rules of one context. `order` keeps insertion order; a replaced key
/// keeps its slot.
#[derive(Debug, Default)]
struct ContextRules {
    slots: HashMap<IpAddr, u64>,
    order: BTreeMap<u64, Rule>,
    next_seq: u64,
}

impl ContextRules {
    fn put(&mut self, rule: Rule) {
        let seq = match self.slots.get(&rule.ip) {
            Some(seq) => *seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.slots.insert(rule.ip, seq);
                seq
            }
        };
        self.order.insert(seq, rule);
    }

    fn remove(&mut self, ip: IpAddr) -> bool {
        match self.slots.remove(&ip) {
            Some(seq) => self.order.remove(&seq).is_some(),
            None => false,
        }
    }

    fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.order.len();
        let slots = &mut self.slots;
        self.order.retain(|_, rule| {
            if is_expired(rule, now) {
                slots.remove(&rule.ip);
                false
            } else {
                true
            }
        });
        before - self.order.len()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    contexts: DashMap<String, ContextRules>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
        }
    }

    /// Drop the bucket if it is still empty. The check runs under the shard
    /// lock, so a concurrent upsert into the same context is never lost.
    fn drop_if_empty(&self, context: &str) {
        self.contexts.remove_if(context, |_, rules| rules.is_empty());
    }
}

impl RuleStore for MemoryRuleStore {
    fn upsert(&self, rule: Rule) -> Rule {
        self.contexts
            .entry(rule.context.clone())
            .or_default()
            .put(rule.clone());
        rule
    }

    fn scan_active(&self, context: &str, now: DateTime<Utc>) -> ScanOutcome {
        let (outcome, emptied) = {
            let Some(mut rules) = self.contexts.get_mut(context) else {
                return ScanOutcome::default();
            };
            let purged = rules.purge(now);
            let active: Vec<Rule> = rules.order.values().cloned().collect();
            (ScanOutcome { active, purged }, rules.is_empty())
        };

        if emptied {
            self.drop_if_empty(context);
        }
        outcome
    }

    fn remove(&self, context: &str, ip: IpAddr) -> bool {
        let (removed, emptied) = {
            let Some(mut rules) = self.contexts.get_mut(context) else {
                return false;
            };
            let removed = rules.remove(ip);
            (removed, rules.is_empty())
        };

        if emptied {
            self.drop_if_empty(context);
        }
        removed
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        self.contexts.retain(|_, rules| {
            purged += rules.purge(now);
            !rules.is_empty()
        });
        purged
    }

    fn len(&self) -> usize {
        self.contexts.iter().map(|r| r.value().len()).sum()
    }
}
