//! Shared error type across ipwarden crates.

use std::net::IpAddr;

use ipnet::IpNet;
use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed candidate rule.
    ValidationError,
    /// Attempted BLOCK on a protected range.
    SafetyViolation,
    /// No rule for the requested key.
    NotFound,
    /// Invalid gateway configuration.
    BadConfig,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::ValidationError => "VALIDATION_ERROR",
            ClientCode::SafetyViolation => "SAFETY_VIOLATION",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Reasons a candidate rule is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed rule: {0}")]
    Malformed(String),
    #[error("invalid ip address: {0:?}")]
    InvalidAddress(String),
    #[error("context must be at least {min} characters (got {actual})")]
    ContextTooShort { min: usize, actual: usize },
    #[error("ttl_seconds must be greater than 0 (got {0})")]
    NonPositiveTtl(i64),
    #[error("ttl_seconds {0} is out of range")]
    TtlOutOfRange(i64),
    #[error("comment must be at most {max} characters (got {actual})")]
    CommentTooLong { max: usize, actual: usize },
}

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("blocking protected ip {ip} (inside {range}) is not allowed")]
    SafetyViolation { ip: IpAddr, range: IpNet },
    #[error("no rule for ip {ip} in context {context}")]
    NotFound { context: String, ip: String },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl WardenError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            WardenError::Validation(_) => ClientCode::ValidationError,
            WardenError::SafetyViolation { .. } => ClientCode::SafetyViolation,
            WardenError::NotFound { .. } => ClientCode::NotFound,
            WardenError::BadConfig(_) => ClientCode::BadConfig,
            WardenError::Internal(_) => ClientCode::Internal,
        }
    }
}
