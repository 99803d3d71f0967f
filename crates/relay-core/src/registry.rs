//! Connection registry
//!
//! Memoizes one upstream client handle per (host, port, credential) so that
//! repeated requests to the same upstream share a connection pool. Handles
//! live as long as the registry: there is no expiry, health check, or
//! refresh. A failed construction is not cached, so the next request for
//! the same key tries again.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use relay_client::{ChromaApi, ChromaClient, ChromaClientConfig, ClientError};
use tracing::{debug, error, info};

use crate::config::UpstreamSettings;
use crate::error::CoreError;

/// Shared handle to an upstream client
pub type ClientHandle = Arc<dyn ChromaApi>;

/// Placeholder used in cache keys when no credential is supplied
const NO_CREDENTIAL: &str = "none";

/// Normalized upstream target handed to a `ClientFactory`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub host: String,
    pub port: u16,
    pub credential: Option<String>,
    /// Speak HTTPS to the upstream
    pub tls: bool,
}

impl UpstreamTarget {
    /// Strip any scheme from `host` and parse `port`
    ///
    /// An `https://` prefix selects TLS; anything else is plain HTTP.
    pub fn parse(host: &str, port: &str, credential: Option<&str>) -> Result<Self, ClientError> {
        let (host, tls) = match host.strip_prefix("https://") {
            Some(rest) => (rest, true),
            None => (host.strip_prefix("http://").unwrap_or(host), false),
        };
        let host = host.trim_end_matches('/');

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ClientError::InvalidTarget(format!("invalid port '{}'", port)))?;

        Ok(Self {
            host: host.to_string(),
            port,
            credential: credential.map(|c| c.to_string()),
            tls,
        })
    }
}

/// Builds client handles for upstream targets
pub trait ClientFactory: Send + Sync {
    fn connect(&self, target: &UpstreamTarget) -> Result<ClientHandle, ClientError>;
}

/// Factory producing HTTP `ChromaClient`s
pub struct HttpClientFactory {
    settings: UpstreamSettings,
}

impl HttpClientFactory {
    pub fn new(settings: UpstreamSettings) -> Self {
        Self { settings }
    }
}

impl ClientFactory for HttpClientFactory {
    fn connect(&self, target: &UpstreamTarget) -> Result<ClientHandle, ClientError> {
        let client = ChromaClient::new(ChromaClientConfig {
            host: target.host.clone(),
            port: target.port,
            tenant: self.settings.tenant.clone(),
            database: self.settings.database.clone(),
            credential: target.credential.clone(),
            tls: target.tls,
            timeout: self.settings.timeout(),
        })?;

        Ok(Arc::new(client))
    }
}

/// Build the cache key for a target from its raw request values
pub fn cache_key(host: &str, port: &str, credential: Option<&str>) -> String {
    format!("{}:{}:{}", host, port, credential.unwrap_or(NO_CREDENTIAL))
}

/// Keyed cache of upstream client handles
pub struct ConnectionRegistry {
    factory: Arc<dyn ClientFactory>,
    clients: RwLock<HashMap<String, ClientHandle>>,
}

impl ConnectionRegistry {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Get the handle for a target, creating it on first use
    pub fn get_client(
        &self,
        host: &str,
        port: &str,
        credential: Option<&str>,
    ) -> Result<ClientHandle, CoreError> {
        let key = cache_key(host, port, credential);

        if let Some(client) = self.clients.read().get(&key) {
            return Ok(client.clone());
        }

        let client = UpstreamTarget::parse(host, port, credential)
            .and_then(|target| {
                debug!("Creating client for {}:{}", target.host, target.port);
                self.factory.connect(&target)
            })
            .map_err(|e| {
                error!("Failed to create client for {}:{}: {}", host, port, e);
                CoreError::Connect(e)
            })?;

        // A concurrent first request may have inserted already; keep that one
        let mut clients = self.clients.write();
        let client = clients.entry(key).or_insert(client).clone();
        metrics::gauge!("chroma_relay_cached_clients").set(clients.len() as f64);

        info!("Cached client for {} ({} cached)", client.base_url(), clients.len());
        Ok(client)
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}
