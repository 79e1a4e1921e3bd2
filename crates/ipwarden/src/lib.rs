//! Top-level facade crate for ipwarden.
//!
//! Re-exports the policy engine and the gateway library so users can depend on a single crate.

pub mod core {
    pub use ipwarden_core::*;
}

pub mod gateway {
    pub use ipwarden_gateway::*;
}
