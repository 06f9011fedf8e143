//! Request metrics keyed by normalized request path.
//!
//! `MetricsAggregator` is the single shared mutable resource of the gateway.
//! It is constructed once at startup and handed by `Arc` to the access-log
//! middleware (writer) and the `/metrics` handler (reader).

mod aggregator;
pub mod histogram;
pub mod path_key;

pub use aggregator::MetricsAggregator;
pub use histogram::{DurationSeries, DurationStorage, BUCKETS_SECONDS};
pub use path_key::normalize_path;
