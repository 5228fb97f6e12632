//! Top-level facade crate for tsgate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use tsgate_core::*;
}

pub mod gateway {
    pub use tsgate_gateway::*;
}
