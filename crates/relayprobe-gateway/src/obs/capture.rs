//! Response status capture.
//!
//! axum hands the finished `Response` back up the stack, but the access-log
//! middleware should not depend on that: it reads the status from a
//! `StatusSlot` that a decorator around the handler fills in. The decorator
//! only intercepts the status; the request and response pass through
//! untouched.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{extract::Request, http::StatusCode, response::Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

/// Per-request status cell. Reads 200 until the first `write_header`.
#[derive(Debug, Clone)]
pub struct StatusSlot(Arc<SlotInner>);

#[derive(Debug)]
struct SlotInner {
    code: AtomicU16,
    written: AtomicBool,
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self(Arc::new(SlotInner {
            code: AtomicU16::new(StatusCode::OK.as_u16()),
            written: AtomicBool::new(false),
        }))
    }
}

impl StatusSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `status`. Only the first call sticks.
    pub fn write_header(&self, status: StatusCode) {
        if !self.0.written.swap(true, Ordering::AcqRel) {
            self.0.code.store(status.as_u16(), Ordering::Release);
        }
    }

    pub fn status(&self) -> u16 {
        self.0.code.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureStatusLayer;

impl<S> Layer<S> for CaptureStatusLayer {
    type Service = CaptureStatus<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CaptureStatus { inner }
    }
}

/// Service decorator that copies the response status into the request's
/// `StatusSlot` extension, when one is present.
#[derive(Debug, Clone)]
pub struct CaptureStatus<S> {
    inner: S,
}

impl<S> Service<Request> for CaptureStatus<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let slot = req.extensions().get::<StatusSlot>().cloned();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = fut.await?;
            if let Some(slot) = slot {
                slot.write_header(response.status());
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ok() {
        let slot = StatusSlot::new();
        assert_eq!(slot.status(), 200);
    }

    #[test]
    fn first_write_wins() {
        let slot = StatusSlot::new();
        let shared = slot.clone();
        shared.write_header(StatusCode::SERVICE_UNAVAILABLE);
        shared.write_header(StatusCode::OK);
        assert_eq!(slot.status(), 503);
    }
}
