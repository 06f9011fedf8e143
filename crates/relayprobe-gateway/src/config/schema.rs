use std::net::{Ipv4Addr, SocketAddr};

use relayprobe_core::error::{RelayError, Result};
use relayprobe_core::DurationStorage;

/// Startup configuration. Immutable once the server is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Reported by `/version` and the `app_info` metric.
    pub version: String,
    /// Single upstream that `/` is forwarded to.
    pub backend_url: String,
    pub port: u16,
    pub duration_storage: DurationStorage,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            backend_url: default_backend_url(),
            port: default_port(),
            duration_storage: DurationStorage::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(RelayError::InvalidConfig("PORT must be between 1 and 65535".into()));
        }

        // A malformed backend is not fatal: each forwarded request answers 500.
        if !self.backend_looks_valid() {
            tracing::warn!(backend = %self.backend_url, "BACKEND is not an absolute http(s) URL");
        }
        Ok(())
    }

    /// Listen on every interface, like `:PORT`.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    fn backend_looks_valid(&self) -> bool {
        reqwest::Url::parse(&self.backend_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false)
    }
}

pub(crate) fn default_version() -> String {
    "1.0.0".into()
}
pub(crate) fn default_backend_url() -> String {
    "http://localhost:8080/version".into()
}
pub(crate) fn default_port() -> u16 {
    8080
}
