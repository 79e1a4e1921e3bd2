//! HTTP transport for the policy engine.

pub mod http;
