use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use super::histogram::{escape_label, render_histogram, DurationSeries, DurationStorage};
use super::path_key::normalize_path;

/// The three per-path maps. A key present in `total_requests` is present in
/// the other two as well; all three are only touched under the write lock.
#[derive(Debug, Default)]
struct MetricsSnapshot {
    total_requests: BTreeMap<String, u64>,
    status_codes: BTreeMap<String, BTreeMap<u16, u64>>,
    request_durations: BTreeMap<String, DurationSeries>,
}

/// Process-wide request metrics guarded by one reader/writer lock.
///
/// `record` serializes against every other call; `render` calls may overlap
/// each other but never a `record`, so a reader can't observe a counter
/// without its matching duration entry.
#[derive(Debug)]
pub struct MetricsAggregator {
    version: String,
    storage: DurationStorage,
    started: Instant,
    inner: RwLock<MetricsSnapshot>,
}

impl MetricsAggregator {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_storage(version, DurationStorage::default())
    }

    pub fn with_storage(version: impl Into<String>, storage: DurationStorage) -> Self {
        Self {
            version: version.into(),
            storage,
            started: Instant::now(),
            inner: RwLock::new(MetricsSnapshot::default()),
        }
    }

    pub fn storage(&self) -> DurationStorage {
        self.storage
    }

    // Poisoning only means a writer panicked mid-update elsewhere; the maps
    // are still structurally valid, so keep serving them.
    fn read(&self) -> RwLockReadGuard<'_, MetricsSnapshot> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MetricsSnapshot> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one finished request under the normalized form of `raw_path`.
    pub fn record(&self, raw_path: &str, status_code: u16, duration: Duration) {
        let key = normalize_path(raw_path);
        tracing::debug!(raw = %raw_path, key = %key, "metrics path normalized");

        let secs = duration.as_secs_f64();
        let mut m = self.write();

        *m.total_requests.entry(key.clone()).or_insert(0) += 1;
        *m.status_codes
            .entry(key.clone())
            .or_default()
            .entry(status_code)
            .or_insert(0) += 1;
        m.request_durations
            .entry(key)
            .or_insert_with(|| DurationSeries::new(self.storage))
            .push(secs);
    }

    /// Render the current state in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let m = self.read();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP app_info Information about the application");
        let _ = writeln!(out, "# TYPE app_info gauge");
        let _ = writeln!(out, "app_info{{version=\"{}\"}} 1\n", escape_label(&self.version));

        let _ = writeln!(out, "# HELP app_uptime_seconds How long the application has been running");
        let _ = writeln!(out, "# TYPE app_uptime_seconds counter");
        let _ = writeln!(out, "app_uptime_seconds {}\n", self.started.elapsed().as_secs());

        let _ = writeln!(out, "# HELP http_requests_total Total number of HTTP requests");
        let _ = writeln!(out, "# TYPE http_requests_total counter");
        for (path, count) in &m.total_requests {
            let _ = writeln!(out, "http_requests_total{{path=\"{}\"}} {}", escape_label(path), count);
        }
        out.push('\n');

        let _ = writeln!(out, "# HELP http_response_status_total HTTP response status codes");
        let _ = writeln!(out, "# TYPE http_response_status_total counter");
        for (path, codes) in &m.status_codes {
            let path = escape_label(path);
            for (code, count) in codes {
                let _ = writeln!(
                    out,
                    "http_response_status_total{{path=\"{}\",code=\"{}\"}} {}",
                    path, code, count
                );
            }
        }
        out.push('\n');

        let _ = writeln!(out, "# HELP http_request_duration_seconds HTTP request duration in seconds");
        let _ = writeln!(out, "# TYPE http_request_duration_seconds histogram");
        for (path, series) in &m.request_durations {
            render_histogram("http_request_duration_seconds", path, series, &mut out);
        }

        out
    }

    /// Total requests recorded for `raw_path` (normalized before lookup).
    pub fn total_for(&self, raw_path: &str) -> u64 {
        let key = normalize_path(raw_path);
        self.read().total_requests.get(&key).copied().unwrap_or(0)
    }

    /// Count of `status_code` responses recorded for `raw_path`.
    pub fn status_for(&self, raw_path: &str, status_code: u16) -> u64 {
        let key = normalize_path(raw_path);
        self.read()
            .status_codes
            .get(&key)
            .and_then(|codes| codes.get(&status_code))
            .copied()
            .unwrap_or(0)
    }

    /// Number of duration observations held for `raw_path`.
    pub fn observations_for(&self, raw_path: &str) -> u64 {
        let key = normalize_path(raw_path);
        self.read().request_durations.get(&key).map(DurationSeries::len).unwrap_or(0)
    }

    /// Distinct path keys seen so far.
    pub fn path_keys(&self) -> Vec<String> {
        self.read().total_requests.keys().cloned().collect()
    }
}
