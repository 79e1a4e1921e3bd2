//! Rule model and candidate validation.
//!
//! `RuleCandidate` is what callers submit; `Rule` is what the store keeps.
//! `RuleCandidate::validate` is the single gate between the two and runs
//! before any state is touched.

use std::net::IpAddr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum length (in characters) of a context identifier.
pub const MIN_CONTEXT_LEN: usize = 3;
/// Maximum length (in characters) of a rule comment.
pub const MAX_COMMENT_LEN: usize = 200;

/// What the enforcement point should do with traffic from the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Allow,
    Block,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Block => "BLOCK",
        }
    }
}

/// Unvalidated rule as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleCandidate {
    pub ip: String,
    pub action: Action,
    pub context: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
}

/// Candidate that passed validation; carries the parsed address and TTL.
#[derive(Debug, Clone)]
pub struct ValidatedRule {
    pub ip: IpAddr,
    pub action: Action,
    pub context: String,
    pub comment: Option<String>,
    pub ttl_seconds: Option<u64>,
}

impl RuleCandidate {
    pub fn new(ip: impl Into<String>, action: Action, context: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            action,
            context: context.into(),
            comment: None,
            ttl_seconds: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check every field constraint. Pure: no clock, no store.
    pub fn validate(&self) -> Result<ValidatedRule, ValidationError> {
        let ip: IpAddr = self
            .ip
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(self.ip.clone()))?;

        let context_len = self.context.chars().count();
        if context_len < MIN_CONTEXT_LEN {
            return Err(ValidationError::ContextTooShort {
                min: MIN_CONTEXT_LEN,
                actual: context_len,
            });
        }

        if let Some(comment) = &self.comment {
            let len = comment.chars().count();
            if len > MAX_COMMENT_LEN {
                return Err(ValidationError::CommentTooLong {
                    max: MAX_COMMENT_LEN,
                    actual: len,
                });
            }
        }

        let ttl_seconds = match self.ttl_seconds {
            None => None,
            Some(secs) if secs <= 0 => return Err(ValidationError::NonPositiveTtl(secs)),
            Some(secs) if TimeDelta::try_seconds(secs).is_none() => {
                return Err(ValidationError::TtlOutOfRange(secs))
            }
            Some(secs) => Some(secs as u64),
        };

        Ok(ValidatedRule {
            ip,
            action: self.action,
            context: self.context.clone(),
            comment: self.comment.clone(),
            ttl_seconds,
        })
    }
}

/// A stored policy rule. Unique per (context, ip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub ip: IpAddr,
    pub action: Action,
    pub context: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ValidatedRule {
    /// Stamp the rule with its creation time and derive `expires_at`.
    pub fn into_rule(self, now: DateTime<Utc>) -> Result<Rule, ValidationError> {
        let expires_at = match self.ttl_seconds {
            Some(secs) => {
                let secs = secs as i64;
                let at = TimeDelta::try_seconds(secs)
                    .and_then(|ttl| now.checked_add_signed(ttl))
                    .ok_or(ValidationError::TtlOutOfRange(secs))?;
                Some(at)
            }
            None => None,
        };

        Ok(Rule {
            ip: self.ip,
            action: self.action,
            context: self.context,
            comment: self.comment,
            ttl_seconds: self.ttl_seconds,
            created_at: now,
            expires_at,
        })
    }
}
