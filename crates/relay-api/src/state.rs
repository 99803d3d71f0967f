//! Application state

use relay_core::{RelayService, UpstreamAddress, UpstreamSettings};
use std::sync::Arc;

/// Prometheus handle used to render the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub upstream: Arc<UpstreamSettings>,
    pub distinct_error_status: bool,
}

impl AppState {
    pub fn new(
        relay: Arc<RelayService>,
        upstream: UpstreamSettings,
        distinct_error_status: bool,
    ) -> Self {
        Self {
            relay,
            upstream: Arc::new(upstream),
            distinct_error_status,
        }
    }

    /// Resolve request parameters against the configured defaults
    pub fn address(
        &self,
        url: Option<String>,
        port: Option<String>,
        api_key: Option<String>,
    ) -> UpstreamAddress {
        UpstreamAddress::new(
            url.unwrap_or_else(|| self.upstream.default_host.clone()),
            port.unwrap_or_else(|| self.upstream.default_port.to_string()),
        )
        .with_credential(api_key)
    }
}
