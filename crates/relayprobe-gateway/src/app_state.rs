//! Shared application state for the relayprobe gateway.
//!
//! Everything here is built once in `main` and cloned cheaply into every
//! handler. Only the metrics aggregator is mutable after startup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use relayprobe_core::error::{RelayError, Result};
use relayprobe_core::MetricsAggregator;

use crate::config::AppConfig;

/// Fixed total timeout for one forwarded request.
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<MetricsAggregator>,
}

struct AppStateInner {
    cfg: AppConfig,
    client: reqwest::Client,
    started: Instant,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .build()
            .map_err(|e| RelayError::Internal(format!("http client init failed: {e}")))?;

        let metrics = Arc::new(MetricsAggregator::with_storage(
            cfg.version.clone(),
            cfg.duration_storage,
        ));
        tracing::debug!(storage = metrics.storage().as_str(), "metrics aggregator ready");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, client, started: Instant::now() }),
            metrics,
        })
    }

    pub fn version(&self) -> &str {
        &self.inner.cfg.version
    }

    pub fn backend_url(&self) -> &str {
        &self.inner.cfg.backend_url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Time since the state was built (process start, in practice).
    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }

    pub fn metrics(&self) -> Arc<MetricsAggregator> {
        Arc::clone(&self.metrics)
    }
}
