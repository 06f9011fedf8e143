//! Single-hop forwarding of `/` to the configured backend.
//!
//! No retries, no pooling policy of our own, no load balancing: one inbound
//! request becomes exactly one backend request with a fixed total timeout
//! (see `BACKEND_TIMEOUT`). Both bodies are streamed.

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{
        header::{CONNECTION, HOST, TRANSFER_ENCODING},
        request::Parts,
        HeaderMap,
    },
    response::Response,
};
use futures_util::TryStreamExt;

use relayprobe_core::error::RelayError;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::ops::ensure_path;

pub const PROXY_PATH: &str = "/";

pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, ApiError> {
    ensure_path(req.uri(), PROXY_PATH)?;

    let (parts, body) = req.into_parts();
    let outbound = build_outbound(state.client(), state.backend_url(), &parts, body)?;

    let upstream = state.client().execute(outbound).await.map_err(|e| {
        tracing::warn!(backend = %state.backend_url(), error = %e, "backend request failed");
        RelayError::Upstream(e.to_string())
    })?;

    Ok(relay_response(upstream))
}

/// Same method, every inbound header (multi-valued kept), inbound body
/// streamed through. `Host` is left to the backend URL.
fn build_outbound(
    client: &reqwest::Client,
    backend: &str,
    parts: &Parts,
    body: Body,
) -> Result<reqwest::Request, RelayError> {
    let mut builder = client.request(parts.method.clone(), backend);
    if body.size_hint().exact() != Some(0) {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let mut outbound = builder.build().map_err(|e| RelayError::RequestBuild(e.to_string()))?;

    let headers = outbound.headers_mut();
    for (name, value) in &parts.headers {
        if name == HOST {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    Ok(outbound)
}

/// Backend status verbatim, headers copied, body streamed. Once this
/// returns the status is committed; a failure mid-body is only logged.
fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();

    let mut headers = HeaderMap::with_capacity(upstream.headers().len());
    for (name, value) in upstream.headers() {
        // framing is redone on our side
        if name == CONNECTION || name == TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let stream = upstream
        .bytes_stream()
        .inspect_err(|e| tracing::warn!(error = %e, "Error copying response body"));

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
