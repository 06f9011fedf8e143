//! Per-path duration series and cumulative histogram math.
//!
//! Bucket upper bounds are fixed in seconds. Buckets are cumulative: an
//! observation increments every bucket whose bound is `>=` the value, and the
//! implicit `+Inf` bucket counts every observation.

use std::fmt::Write;
use std::str::FromStr;

use crate::error::RelayError;

/// Fixed bucket upper bounds in seconds. `+Inf` is implicit.
pub const BUCKETS_SECONDS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// How observed durations are retained per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationStorage {
    /// Keep every observation for the process lifetime (unbounded growth).
    #[default]
    Raw,
    /// Fold observations into bucket counters, sum and count at record time.
    /// Memory per path is constant and the rendered output is identical.
    Folded,
}

impl DurationStorage {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationStorage::Raw => "raw",
            DurationStorage::Folded => "folded",
        }
    }
}

impl FromStr for DurationStorage {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(DurationStorage::Raw),
            "folded" => Ok(DurationStorage::Folded),
            other => Err(RelayError::InvalidConfig(format!(
                "unknown duration storage: {other} (expected raw|folded)"
            ))),
        }
    }
}

/// Computed histogram for one path.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSummary {
    /// Cumulative counts aligned with `BUCKETS_SECONDS`.
    pub buckets: [u64; BUCKETS_SECONDS.len()],
    /// `+Inf` bucket; always equal to `count`.
    pub inf: u64,
    pub sum: f64,
    pub count: u64,
}

impl Default for HistogramSummary {
    fn default() -> Self {
        Self { buckets: [0; BUCKETS_SECONDS.len()], inf: 0, sum: 0.0, count: 0 }
    }
}

impl HistogramSummary {
    fn observe(&mut self, secs: f64) {
        self.sum += secs;
        for (i, &b) in BUCKETS_SECONDS.iter().enumerate() {
            if secs <= b {
                self.buckets[i] += 1;
            }
        }
        self.inf += 1;
        self.count += 1;
    }
}

/// Durations observed for one path key.
#[derive(Debug, Clone)]
pub enum DurationSeries {
    Raw(Vec<f64>),
    Folded(HistogramSummary),
}

impl DurationSeries {
    pub fn new(storage: DurationStorage) -> Self {
        match storage {
            DurationStorage::Raw => DurationSeries::Raw(Vec::new()),
            DurationStorage::Folded => DurationSeries::Folded(HistogramSummary::default()),
        }
    }

    /// Append one observation, in seconds.
    pub fn push(&mut self, secs: f64) {
        match self {
            DurationSeries::Raw(v) => v.push(secs),
            DurationSeries::Folded(h) => h.observe(secs),
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            DurationSeries::Raw(v) => v.len() as u64,
            DurationSeries::Folded(h) => h.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket the series. Raw series are folded on demand in observation order.
    pub fn summarize(&self) -> HistogramSummary {
        match self {
            DurationSeries::Raw(v) => {
                let mut h = HistogramSummary::default();
                for &d in v {
                    h.observe(d);
                }
                h
            }
            DurationSeries::Folded(h) => h.clone(),
        }
    }
}

/// Helper to escape label values.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render one path's histogram block (buckets, `+Inf`, sum, count).
pub(crate) fn render_histogram(name: &str, path: &str, series: &DurationSeries, out: &mut String) {
    let h = series.summarize();
    let path = escape_label(path);

    for (i, le) in BUCKETS_SECONDS.iter().enumerate() {
        let _ = writeln!(out, "{name}_bucket{{path=\"{path}\",le=\"{le}\"}} {}", h.buckets[i]);
    }
    let _ = writeln!(out, "{name}_bucket{{path=\"{path}\",le=\"+Inf\"}} {}", h.inf);
    let _ = writeln!(out, "{name}_sum{{path=\"{path}\"}} {}", h.sum);
    let _ = writeln!(out, "{name}_count{{path=\"{path}\"}} {}", h.count);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_buckets() {
        let mut s = DurationSeries::new(DurationStorage::Raw);
        s.push(0.03);
        let h = s.summarize();
        // 0.03 falls under 0.05 and every larger bound
        assert_eq!(h.buckets, [0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(h.inf, 1);
    }

    #[test]
    fn boundary_is_inclusive() {
        let mut s = DurationSeries::new(DurationStorage::Raw);
        s.push(0.005);
        assert_eq!(s.summarize().buckets[0], 1);
    }

    #[test]
    fn beyond_last_bound_only_hits_inf() {
        let mut s = DurationSeries::new(DurationStorage::Folded);
        s.push(42.0);
        let h = s.summarize();
        assert!(h.buckets.iter().all(|&c| c == 0));
        assert_eq!(h.inf, 1);
        assert_eq!(h.count, 1);
    }

    #[test]
    fn folded_matches_raw() {
        let samples = [0.001, 0.02, 0.3, 0.3, 7.5, 11.0, 0.1];
        let mut raw = DurationSeries::new(DurationStorage::Raw);
        let mut folded = DurationSeries::new(DurationStorage::Folded);
        for d in samples {
            raw.push(d);
            folded.push(d);
        }
        assert_eq!(raw.summarize(), folded.summarize());
    }

    #[test]
    fn storage_parse() {
        assert_eq!("RAW".parse::<DurationStorage>().unwrap(), DurationStorage::Raw);
        assert_eq!(" folded ".parse::<DurationStorage>().unwrap(), DurationStorage::Folded);
        assert!("ring".parse::<DurationStorage>().is_err());
    }

    #[test]
    fn le_labels_use_shortest_form() {
        let mut s = DurationSeries::new(DurationStorage::Raw);
        s.push(0.5);
        let mut out = String::new();
        render_histogram("h", "/", &s, &mut out);
        assert!(out.contains("h_bucket{path=\"/\",le=\"0.005\"} 0\n"));
        assert!(out.contains("h_bucket{path=\"/\",le=\"1\"} 1\n"));
        assert!(out.contains("h_bucket{path=\"/\",le=\"10\"} 1\n"));
        assert!(out.contains("h_bucket{path=\"/\",le=\"+Inf\"} 1\n"));
        assert!(out.contains("h_sum{path=\"/\"} 0.5\n"));
        assert!(out.contains("h_count{path=\"/\"} 1\n"));
    }
}
