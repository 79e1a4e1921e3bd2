//! In-memory rule store: ordering, lazy purge, concurrent writers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::IpAddr;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use ipwarden_core::expiry::is_expired;
use ipwarden_core::{Action, MemoryRuleStore, Rule, RuleStore};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn rule(ctx: &str, ip: &str, action: Action, ttl: Option<i64>) -> Rule {
    Rule {
        ip: ip.parse().unwrap(),
        action,
        context: ctx.to_string(),
        comment: None,
        ttl_seconds: ttl.map(|s| s as u64),
        created_at: t0(),
        expires_at: ttl.map(|s| t0() + TimeDelta::seconds(s)),
    }
}

fn ips(rules: &[Rule]) -> Vec<String> {
    rules.iter().map(|r| r.ip.to_string()).collect()
}

#[test]
fn expiry_predicate_is_strict() {
    let r = rule("prod", "203.0.113.1", Action::Block, Some(5));
    assert!(!is_expired(&r, t0()));
    assert!(!is_expired(&r, t0() + TimeDelta::seconds(5)));
    assert!(is_expired(&r, t0() + TimeDelta::seconds(6)));

    let forever = rule("prod", "203.0.113.1", Action::Block, None);
    assert!(!is_expired(&forever, t0() + TimeDelta::days(10_000)));
}

#[test]
fn scan_keeps_insertion_order_and_replacement_slot() {
    let store = MemoryRuleStore::new();
    store.upsert(rule("prod", "203.0.113.1", Action::Block, None));
    store.upsert(rule("prod", "203.0.113.2", Action::Allow, None));
    store.upsert(rule("prod", "203.0.113.3", Action::Block, None));
    store.upsert(rule("prod", "203.0.113.1", Action::Allow, None));

    let out = store.scan_active("prod", t0());
    assert_eq!(ips(&out.active), ["203.0.113.1", "203.0.113.2", "203.0.113.3"]);
    assert_eq!(out.active[0].action, Action::Allow);
    assert_eq!(out.purged, 0);
}

#[test]
fn scan_purges_only_its_own_context() {
    let store = MemoryRuleStore::new();
    store.upsert(rule("prod", "203.0.113.1", Action::Block, Some(1)));
    store.upsert(rule("prod", "203.0.113.2", Action::Block, None));
    store.upsert(rule("dev", "203.0.113.1", Action::Block, Some(1)));

    let later = t0() + TimeDelta::seconds(2);
    let out = store.scan_active("prod", later);
    assert_eq!(ips(&out.active), ["203.0.113.2"]);
    assert_eq!(out.purged, 1);

    // "dev" was not read, so its expired rule is still held
    assert_eq!(store.len(), 2);
    assert_eq!(store.purge_expired(later), 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_exact_key_only() {
    let store = MemoryRuleStore::new();
    store.upsert(rule("prod", "203.0.113.1", Action::Block, None));
    store.upsert(rule("prod", "203.0.113.2", Action::Block, None));

    let ip: IpAddr = "203.0.113.1".parse().unwrap();
    assert!(!store.remove("dev", ip));
    assert!(store.remove("prod", ip));
    assert!(!store.remove("prod", ip));
    assert_eq!(ips(&store.scan_active("prod", t0()).active), ["203.0.113.2"]);

    assert!(store.remove("prod", "203.0.113.2".parse().unwrap()));
    assert!(store.is_empty());
}

#[test]
fn concurrent_upserts_on_one_key_never_mix() {
    let store = Arc::new(MemoryRuleStore::new());
    let mut handles = Vec::new();

    for w in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..500 {
                let (action, ttl) = if (w + i) % 2 == 0 {
                    (Action::Allow, None)
                } else {
                    (Action::Block, Some(60))
                };
                let mut r = rule("prod", "203.0.113.9", action, ttl);
                r.comment = Some(format!("{action:?}"));
                store.upsert(r);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let out = store.scan_active("prod", t0());
    assert_eq!(out.active.len(), 1);
    let r = &out.active[0];
    // every field comes from the same write
    match r.action {
        Action::Allow => {
            assert_eq!(r.ttl_seconds, None);
            assert_eq!(r.expires_at, None);
            assert_eq!(r.comment.as_deref(), Some("Allow"));
        }
        Action::Block => {
            assert_eq!(r.ttl_seconds, Some(60));
            assert!(r.expires_at.is_some());
            assert_eq!(r.comment.as_deref(), Some("Block"));
        }
    }
}

#[test]
fn scans_racing_writers_lose_nothing() {
    let store = Arc::new(MemoryRuleStore::new());
    let later = t0() + TimeDelta::seconds(10);

    // expired residue so every scan has something to purge
    for i in 0..50 {
        store.upsert(rule("prod", &format!("198.51.100.{i}"), Action::Block, Some(1)));
    }

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..200u32 {
                let ip = format!("2001:db8::{:x}", i + 1);
                store.upsert(rule("prod", &ip, Action::Block, None));
            }
        })
    };
    let scanner = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                store.scan_active("prod", later);
            }
        })
    };
    writer.join().unwrap();
    scanner.join().unwrap();

    let out = store.scan_active("prod", later);
    assert_eq!(out.active.len(), 200);
    assert_eq!(store.len(), 200);
}

#[test]
fn record_shape_uses_upper_case_actions_and_plain_addresses() {
    let r = rule("prod", "2001:db8::1", Action::Block, Some(30));
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["ip"], "2001:db8::1");
    assert_eq!(v["action"], "BLOCK");
    assert_eq!(v["ttl_seconds"], 30);
    assert!(v["expires_at"].is_string());
    assert!(v["comment"].is_null());

    let back: Rule = serde_json::from_value(v).unwrap();
    assert_eq!(back, r);
}
