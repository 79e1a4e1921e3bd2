//! ipwarden core: the IP access-policy engine, its rule model, and error types.
//!
//! This crate owns everything a WAF control plane needs to keep allow/block
//! rules per tenant context: the safety net of protected ranges, lazy TTL
//! expiration, the keyed rule store, and the projection into allow/block lists.
//! It intentionally carries no transport or runtime dependencies so it can be
//! embedded behind any surface (HTTP gateway, CLI, tests).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every rejected write surfaces as `WardenError` before the store is touched.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod rule;
pub mod safety;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use engine::{Configuration, PolicyEngine};
pub use error::{Result, ValidationError, WardenError};
pub use rule::{Action, Rule, RuleCandidate};
pub use safety::SafetyGuard;
pub use store::{MemoryRuleStore, RuleStore, ScanOutcome};
