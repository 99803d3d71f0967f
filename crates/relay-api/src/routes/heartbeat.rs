//! Upstream liveness route

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use relay_core::{CoreError, HeartbeatStatus};
use tracing::debug;

use super::{UpstreamQuery, rejected, respond};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /heartbeat
async fn heartbeat(
    State(state): State<AppState>,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
) -> Result<Json<HeartbeatStatus>, ApiError> {
    respond("heartbeat", check(&state, query).await)
}

async fn check(
    state: &AppState,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
) -> Result<HeartbeatStatus, CoreError> {
    let Query(query) = query.map_err(rejected)?;
    let address = state.address(query.url, query.port, query.api_key);
    debug!("Heartbeat: {}:{}", address.host, address.port);

    state.relay.heartbeat(&address).await
}

/// Create heartbeat routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/heartbeat", get(heartbeat))
}
