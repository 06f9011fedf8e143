//! Axum router wiring.
//!
//! Exact-path routes for the proxy and the operational endpoints, a JSON
//! 404 fallback, and the observation layers around all of them.

use axum::{middleware, routing::any, Router};

use crate::{app_state::AppState, obs, ops, proxy};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(proxy::PROXY_PATH, any(proxy::forward))
        .route(ops::VERSION_PATH, any(ops::version))
        .route(ops::LIVE_PATH, any(ops::liveness))
        .route(ops::READY_PATH, any(ops::readiness))
        .route(ops::METRICS_PATH, any(ops::metrics))
        .fallback(ops::not_found)
        // innermost first: capture sits directly on the handler
        .layer(obs::CaptureStatusLayer)
        .layer(middleware::from_fn_with_state(state.clone(), obs::access_log))
        .with_state(state)
}
