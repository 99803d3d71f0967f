//! Relay service
//!
//! One method per relay operation. Each resolves a client handle through
//! the registry, calls the upstream, and maps the response into result
//! records.

use std::sync::Arc;

use futures::{StreamExt, stream};
use relay_client::{GetRequest, Include, QueryRequest};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::models::{
    CollectionDescriptor, DocumentRecord, HeartbeatStatus, SearchRequest, SearchResult,
};
use crate::registry::{ClientHandle, ConnectionRegistry};

/// Maximum number of collection counts fetched at once
const COUNT_CONCURRENCY: usize = 8;

/// Upstream address as supplied by a request, before normalization
#[derive(Debug, Clone)]
pub struct UpstreamAddress {
    pub host: String,
    pub port: String,
    pub credential: Option<String>,
}

impl UpstreamAddress {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            credential: None,
        }
    }

    /// Attach a credential; an empty value means none
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.filter(|c| !c.is_empty());
        self
    }
}

/// Relay operations over the connection registry
pub struct RelayService {
    registry: Arc<ConnectionRegistry>,
}

impl RelayService {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    fn client(&self, address: &UpstreamAddress) -> Result<ClientHandle, CoreError> {
        self.registry
            .get_client(&address.host, &address.port, address.credential.as_deref())
    }

    /// Check that the upstream answers
    pub async fn heartbeat(&self, address: &UpstreamAddress) -> Result<HeartbeatStatus, CoreError> {
        let client = self.client(address)?;
        client.heartbeat().await?;

        debug!("Upstream {} is alive", client.base_url());
        Ok(HeartbeatStatus::connected())
    }

    /// List collections with their record counts
    ///
    /// A failed count is logged and reported as `0`; it never fails the
    /// listing.
    pub async fn list_collections(
        &self,
        address: &UpstreamAddress,
    ) -> Result<Vec<CollectionDescriptor>, CoreError> {
        let client = self.client(address)?;
        let collections = client.list_collections().await?;

        let ids: Vec<String> = collections.iter().map(|c| c.id.clone()).collect();
        let counts: Vec<_> = stream::iter(ids)
            .map(|id| {
                let client = client.clone();
                async move { client.count(&id).await }
            })
            .buffered(COUNT_CONCURRENCY)
            .collect()
            .await;

        let descriptors = collections
            .into_iter()
            .zip(counts)
            .map(|(collection, count)| {
                let count = count.unwrap_or_else(|e| {
                    warn!("Failed to count collection {}: {}", collection.name, e);
                    metrics::counter!("chroma_relay_count_failures_total").increment(1);
                    0
                });
                CollectionDescriptor::new(collection, count)
            })
            .collect();

        Ok(descriptors)
    }

    /// Fetch up to `limit` records of a collection
    pub async fn get_documents(
        &self,
        address: &UpstreamAddress,
        collection_name: &str,
        limit: u32,
    ) -> Result<Vec<DocumentRecord>, CoreError> {
        let client = self.client(address)?;
        let collection = client.get_collection(collection_name).await?;

        let result = client
            .get(
                &collection.id,
                &GetRequest {
                    limit: Some(limit),
                    include: vec![Include::Documents, Include::Metadatas, Include::Embeddings],
                },
            )
            .await?;

        debug!(
            "Fetched {} records from {}",
            result.ids.len(),
            collection_name
        );
        Ok(DocumentRecord::from_get_result(result))
    }

    /// Nearest neighbours of a query text
    pub async fn search(
        &self,
        address: &UpstreamAddress,
        collection_name: &str,
        request: SearchRequest,
    ) -> Result<Vec<SearchResult>, CoreError> {
        let client = self.client(address)?;
        let collection = client.get_collection(collection_name).await?;

        let result = client
            .query(
                &collection.id,
                &QueryRequest {
                    query_texts: vec![request.query],
                    n_results: request.limit,
                    include: vec![Include::Documents, Include::Metadatas, Include::Distances],
                },
            )
            .await?;

        Ok(SearchResult::from_query_result(result))
    }
}
