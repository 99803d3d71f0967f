//! Shared upstream configuration
//!
//! Loaded by the chroma-relay binary as the `[upstream]` table and handed
//! to the client factory and the API layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream defaults and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Host used when a request carries no `url` parameter
    #[serde(default = "default_host")]
    pub default_host: String,
    /// Port used when a request carries no `port` parameter
    #[serde(default = "default_port")]
    pub default_port: u16,
    /// ChromaDB tenant
    #[serde(default = "default_tenant")]
    pub tenant: String,
    /// ChromaDB database
    #[serde(default = "default_database")]
    pub database: String,
    /// Per-request timeout for upstream calls (unset waits indefinitely)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            default_host: default_host(),
            default_port: default_port(),
            tenant: default_tenant(),
            database: default_database(),
            timeout_secs: None,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_tenant() -> String {
    "default_tenant".to_string()
}

fn default_database() -> String {
    "default_database".to_string()
}
