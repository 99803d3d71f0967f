//! API routes

mod collections;
mod health;
mod heartbeat;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};
use relay_core::CoreError;
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::apply_status_policy;
use crate::state::{AppState, MetricsHandle};

/// Upstream selection shared by every relay route
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamQuery {
    pub url: Option<String>,
    pub port: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Turn an extractor rejection into an invalid request
fn rejected(rejection: impl Display) -> CoreError {
    CoreError::InvalidRequest(rejection.to_string())
}

/// Count the request and turn the outcome into a JSON response
fn respond<T>(operation: &'static str, result: Result<T, CoreError>) -> Result<Json<T>, ApiError> {
    metrics::counter!("chroma_relay_requests_total", "operation" => operation).increment(1);

    result.map(Json).map_err(|e| {
        metrics::counter!("chroma_relay_errors_total", "operation" => operation).increment(1);
        warn!("{} failed: {}", operation, e);
        ApiError::from(e)
    })
}

/// GET /metrics
async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Proxy health
        .merge(health::routes())
        // Relay routes
        .merge(heartbeat::routes())
        .merge(collections::routes())
        .layer(from_fn_with_state(state.clone(), apply_status_policy))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(render_metrics))
                .with_state(handle),
        );
    }

    // Browsers may call from any origin
    router.layer(CorsLayer::permissive())
}
