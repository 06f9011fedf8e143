//! HTTP mapping for `RelayError`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use relayprobe_core::error::{ErrorKind, RelayError};

/// Handler-facing error; renders the fixed error shapes clients see.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub RelayError);

impl ApiError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self(RelayError::NotFound(path.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::RequestBuild | ErrorKind::InvalidConfig | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct NotFoundBody<'a> {
    status: &'static str,
    message: &'static str,
    path: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            RelayError::NotFound(path) => {
                let body = NotFoundBody {
                    status: "Not Found",
                    message: "The requested URI does not exist",
                    path,
                };
                (status, Json(body)).into_response()
            }
            other => (
                status,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
                ],
                format!("{other}\n"),
            )
                .into_response(),
        }
    }
}
