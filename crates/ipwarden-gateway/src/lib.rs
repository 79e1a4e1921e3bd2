//! ipwarden gateway library entry.
//!
//! This crate wires config, the policy engine, the HTTP transport, the expiry
//! sweeper, and metrics into a servable control plane. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
