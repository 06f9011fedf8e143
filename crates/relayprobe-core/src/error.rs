//! Shared error type across relayprobe crates.

use thiserror::Error;

/// Stable error classification exposed to HTTP callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No route owns the requested path.
    NotFound,
    /// Outbound request could not be constructed.
    RequestBuild,
    /// Backend unreachable or timed out.
    Upstream,
    /// Startup configuration rejected.
    InvalidConfig,
    /// Internal server error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RequestBuild => "REQUEST_BUILD",
            ErrorKind::Upstream => "UPSTREAM",
            ErrorKind::InvalidConfig => "INVALID_CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Carries the request path that matched nothing.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("Error creating request: {0}")]
    RequestBuild(String),
    #[error("Error forwarding to backend: {0}")]
    Upstream(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Classify the error for HTTP mapping and logs.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::NotFound(_) => ErrorKind::NotFound,
            RelayError::RequestBuild(_) => ErrorKind::RequestBuild,
            RelayError::Upstream(_) => ErrorKind::Upstream,
            RelayError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            RelayError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_client_facing_text() {
        let e = RelayError::Upstream("connection refused".into());
        assert_eq!(e.to_string(), "Error forwarding to backend: connection refused");
        assert_eq!(e.kind().as_str(), "UPSTREAM");

        let e = RelayError::RequestBuild("bad url".into());
        assert_eq!(e.to_string(), "Error creating request: bad url");
        assert_eq!(e.kind(), ErrorKind::RequestBuild);
    }
}
