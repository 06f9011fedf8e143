//! Operational HTTP endpoints.
//!
//! - `/version`      : plain-text version line
//! - `/health/live`  : liveness with uptime
//! - `/health/ready` : readiness, echoes the configured backend
//! - `/metrics`      : Prometheus text format
//!
//! Each handler re-checks the exact path it owns and answers 404 otherwise,
//! even though the router already dispatches on exact paths. Paths are
//! compared, logged and recorded percent-decoded.

mod uptime;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::proxy;

pub use uptime::format_uptime;

pub const VERSION_PATH: &str = "/version";
pub const LIVE_PATH: &str = "/health/live";
pub const READY_PATH: &str = "/health/ready";
pub const METRICS_PATH: &str = "/metrics";

/// Request path with percent-escapes resolved. Invalid UTF-8 is replaced.
pub fn decoded_path(uri: &Uri) -> String {
    percent_decode_str(uri.path()).decode_utf8_lossy().into_owned()
}

pub(crate) fn ensure_path(uri: &Uri, owned: &str) -> Result<(), ApiError> {
    let path = decoded_path(uri);
    if path == owned {
        Ok(())
    } else {
        Err(ApiError::not_found(path))
    }
}

pub async fn version(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    ensure_path(&uri, VERSION_PATH)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Version: {}\n", state.version()),
    )
        .into_response())
}

#[derive(Serialize)]
struct LiveBody {
    status: &'static str,
    uptime: String,
}

pub async fn liveness(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    ensure_path(&uri, LIVE_PATH)?;
    Ok(Json(LiveBody { status: "UP", uptime: format_uptime(state.uptime()) }).into_response())
}

#[derive(Serialize)]
struct ReadyBody<'a> {
    status: &'static str,
    backend: &'a str,
}

pub async fn readiness(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    ensure_path(&uri, READY_PATH)?;
    let body = ReadyBody { status: "UP", backend: state.backend_url() };
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub async fn metrics(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    ensure_path(&uri, METRICS_PATH)?;
    let body = state.metrics().render();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Fallback for every raw path no route owns.
///
/// The router matches on the encoded path, so `/%76ersion` lands here and
/// is dispatched again on its decoded form.
pub async fn not_found(State(state): State<AppState>, req: Request) -> Response {
    let path = decoded_path(req.uri());
    match path.as_str() {
        proxy::PROXY_PATH => proxy::forward(State(state), req).await.into_response(),
        VERSION_PATH => version(State(state), req.uri().clone()).await.into_response(),
        LIVE_PATH => liveness(State(state), req.uri().clone()).await.into_response(),
        READY_PATH => readiness(State(state), req.uri().clone()).await.into_response(),
        METRICS_PATH => metrics(State(state), req.uri().clone()).await.into_response(),
        _ => ApiError::not_found(path).into_response(),
    }
}
