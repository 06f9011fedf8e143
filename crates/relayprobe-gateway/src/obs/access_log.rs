//! Access-log middleware.

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{header::USER_AGENT, Method, Version},
    middleware::Next,
    response::Response,
};
use futures_util::{stream::BoxStream, Stream, StreamExt};
use tokio::time::Instant;

use relayprobe_core::MetricsAggregator;

use crate::app_state::AppState;
use crate::obs::capture::StatusSlot;
use crate::ops::decoded_path;

/// Time the request, log one access line, then record metrics under the
/// original request path (not whatever path the handler accepted).
///
/// Bodies with a known length are complete when the handler returns. Any
/// other body is timed until it is fully sent, fails, or is dropped.
pub async fn access_log(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let started = Instant::now();

    let slot = StatusSlot::new();
    req.extensions_mut().insert(slot.clone());

    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let mut entry = AccessEntry {
        metrics: state.metrics(),
        slot,
        started,
        client,
        method: req.method().clone(),
        path: decoded_path(req.uri()),
        proto: req.version(),
        user_agent,
        done: false,
    };

    let response = next.run(req).await;

    if response.body().size_hint().exact().is_some() {
        entry.finish();
        return response;
    }

    let (parts, body) = response.into_parts();
    let stream = TimedBodyStream { inner: body.into_data_stream().boxed(), entry };
    Response::from_parts(parts, Body::from_stream(stream))
}

/// One request's log line and metrics sample, emitted exactly once.
struct AccessEntry {
    metrics: Arc<MetricsAggregator>,
    slot: StatusSlot,
    started: Instant,
    client: String,
    method: Method,
    path: String,
    proto: Version,
    user_agent: String,
    done: bool,
}

impl AccessEntry {
    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;

        let elapsed = self.started.elapsed();
        let status = self.slot.status();

        tracing::info!(
            target: "access",
            client = %self.client,
            method = %self.method,
            path = %self.path,
            proto = ?self.proto,
            status,
            user_agent = %self.user_agent,
            duration = ?elapsed,
            "request"
        );

        self.metrics.record(&self.path, status, elapsed);
    }
}

impl Drop for AccessEntry {
    // client went away before the body finished
    fn drop(&mut self) {
        self.finish();
    }
}

/// Response body stream that closes its `AccessEntry` on end or error.
struct TimedBodyStream {
    inner: BoxStream<'static, Result<Bytes, axum::Error>>,
    entry: AccessEntry,
}

impl Stream for TimedBodyStream {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.inner.poll_next_unpin(cx);
        if let Poll::Ready(None | Some(Err(_))) = &polled {
            this.entry.finish();
        }
        polled
    }
}
