//! relayprobe gateway library entry.
//!
//! This crate wires configuration, the forwarding handler, the operational
//! endpoints, and the access-log/metrics layers into one axum router. It is
//! intended to be consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod proxy;
pub mod router;
