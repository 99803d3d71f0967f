//! API error types
//!
//! Every failure is answered with `{"error": message}`. The status is 500
//! unless distinct statuses are enabled, in which case
//! `middleware::apply_status_policy` rewrites it from the `ErrorKind`
//! attached to the response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_core::{CoreError, ErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Core(e) => e.kind(),
        }
    }
}

/// Status for an error kind when distinct statuses are enabled
pub fn distinct_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unreachable => StatusCode::BAD_GATEWAY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body = axum::Json(json!({ "error": self.to_string() }));

        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}
