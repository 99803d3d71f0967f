//! Response middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use relay_core::ErrorKind;

use crate::error::distinct_status;
use crate::state::AppState;

/// Replace the uniform 500 of error responses with a per-kind status
pub async fn apply_status_policy(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if state.distinct_error_status
        && let Some(kind) = response.extensions().get::<ErrorKind>().copied()
    {
        *response.status_mut() = distinct_status(kind);
    }

    response
}
