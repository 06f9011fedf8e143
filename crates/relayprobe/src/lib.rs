//! Top-level facade crate for relayprobe.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use relayprobe_core::*;
}

pub mod gateway {
    pub use relayprobe_gateway::*;
}
