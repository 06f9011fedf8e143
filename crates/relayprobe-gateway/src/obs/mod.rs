//! Request observation: access logging and response status capture.
//!
//! Every route (and the fallback) runs inside `access_log`, which feeds the
//! shared `MetricsAggregator`. The status it reports comes from the
//! `CaptureStatusLayer` decorator wrapped directly around the handler.

pub mod access_log;
pub mod capture;

pub use access_log::access_log;
pub use capture::{CaptureStatus, CaptureStatusLayer, StatusSlot};
