//! Upstream API trait

use async_trait::async_trait;

use crate::error::ClientError;
use crate::types::{Collection, GetRequest, GetResult, QueryRequest, QueryResult};

/// Operations the relay needs from a ChromaDB server
///
/// `ChromaClient` is the HTTP implementation; tests substitute their own.
#[async_trait]
pub trait ChromaApi: Send + Sync {
    /// Round-trip to the upstream, failing when it cannot be reached
    async fn heartbeat(&self) -> Result<(), ClientError>;

    /// List all collections in the configured tenant and database
    async fn list_collections(&self) -> Result<Vec<Collection>, ClientError>;

    /// Resolve a collection by name
    async fn get_collection(&self, name: &str) -> Result<Collection, ClientError>;

    /// Number of records in a collection
    async fn count(&self, collection_id: &str) -> Result<u64, ClientError>;

    /// Fetch records from a collection
    async fn get(
        &self,
        collection_id: &str,
        request: &GetRequest,
    ) -> Result<GetResult, ClientError>;

    /// Similarity query against a collection
    async fn query(
        &self,
        collection_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResult, ClientError>;

    /// Base URL of the upstream, for logging
    fn base_url(&self) -> &str;
}
