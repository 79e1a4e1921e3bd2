//! TTL expiration predicate.

use chrono::{DateTime, Utc};

use crate::rule::Rule;

/// True iff the rule carries an `expires_at` strictly before `now`.
/// Rules without a TTL never expire.
#[inline]
pub fn is_expired(rule: &Rule, now: DateTime<Utc>) -> bool {
    match rule.expires_at {
        Some(at) => now > at,
        None => false,
    }
}
