//! relayprobe core: error types and the in-process request metrics aggregator.
//!
//! This crate holds everything that does not need an HTTP stack or an async
//! runtime: the shared error surface, metrics path-key normalization, and the
//! aggregator that renders Prometheus text exposition output. The gateway
//! crate feeds it from the access-log middleware.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! `MetricsAggregator::record` in particular must never fail, so lock
//! poisoning is recovered instead of propagated.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{ErrorKind, RelayError, Result};
pub use metrics::{normalize_path, DurationStorage, MetricsAggregator};
