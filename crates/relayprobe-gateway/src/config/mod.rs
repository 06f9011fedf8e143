//! Gateway config loader (environment only, read once at startup).

pub mod schema;

use relayprobe_core::error::{RelayError, Result};

pub use schema::AppConfig;

pub const ENV_VERSION: &str = "VERSION";
pub const ENV_BACKEND: &str = "BACKEND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DURATION_STORAGE: &str = "METRICS_DURATION_STORAGE";

pub fn from_env() -> Result<AppConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build config from an arbitrary variable source. Absent and empty values
/// both fall back to the default.
pub fn from_lookup<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let mut cfg = AppConfig::default();
    if let Some(v) = get(ENV_VERSION) {
        cfg.version = v;
    }
    if let Some(v) = get(ENV_BACKEND) {
        cfg.backend_url = v;
    }
    if let Some(v) = get(ENV_PORT) {
        cfg.port = v
            .trim()
            .parse()
            .map_err(|e| RelayError::InvalidConfig(format!("invalid {ENV_PORT} {v:?}: {e}")))?;
    }
    if let Some(v) = get(ENV_DURATION_STORAGE) {
        cfg.duration_storage = v.parse()?;
    }

    cfg.validate()?;
    Ok(cfg)
}
