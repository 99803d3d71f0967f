//! Result records returned to browsers
//!
//! Each record is built from an upstream response by a single mapping
//! function. Missing columns, short columns, and `null` entries all fall back
//! to the field's default instead of failing the response.

use relay_client::{Collection, GetResult, Metadata, QueryResult};
use serde::{Deserialize, Serialize};

/// Default number of records returned by a document fetch
pub const DEFAULT_DOCUMENT_LIMIT: u32 = 100;

/// Default number of nearest neighbours returned by a search
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Liveness response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    pub status: String,
    pub message: String,
}

impl HeartbeatStatus {
    pub fn connected() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Connected to ChromaDB".to_string(),
        }
    }
}

/// A collection with its record count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    pub id: String,
    pub name: String,
    pub metadata: Metadata,
    pub count: u64,
}

impl CollectionDescriptor {
    pub fn new(collection: Collection, count: u64) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            metadata: collection.metadata.unwrap_or_default(),
            count,
        }
    }
}

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub embeddings: Option<Vec<f64>>,
}

impl DocumentRecord {
    /// One record per returned id, in upstream order
    pub fn from_get_result(result: GetResult) -> Vec<Self> {
        let mut documents = column(result.documents);
        let mut metadatas = column(result.metadatas);
        let mut embeddings = column(result.embeddings);

        result
            .ids
            .into_iter()
            .map(|id| Self {
                id,
                document: documents.next().flatten().unwrap_or_default(),
                metadata: metadatas.next().flatten().unwrap_or_default(),
                embeddings: embeddings.next().flatten(),
            })
            .collect()
    }
}

/// A nearest-neighbour hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub distance: Option<f64>,
}

impl SearchResult {
    /// Flatten the results of a single-text query, keeping upstream rank order
    pub fn from_query_result(result: QueryResult) -> Vec<Self> {
        let ids = result.ids.into_iter().next().unwrap_or_default();
        let mut documents = column(first_query(result.documents));
        let mut metadatas = column(first_query(result.metadatas));
        let mut distances = column(first_query(result.distances));

        ids.into_iter()
            .map(|id| Self {
                id,
                document: documents.next().flatten().unwrap_or_default(),
                metadata: metadatas.next().flatten().unwrap_or_default(),
                distance: distances.next().flatten(),
            })
            .collect()
    }
}

/// Search request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Yield a column's entries, then `None` forever
fn column<T>(values: Option<Vec<Option<T>>>) -> impl Iterator<Item = Option<T>> {
    values
        .into_iter()
        .flatten()
        .chain(std::iter::repeat_with(|| None))
}

/// The per-query column of the first (only) query text
fn first_query<T>(values: Option<Vec<Option<Vec<Option<T>>>>>) -> Option<Vec<Option<T>>> {
    values.and_then(|queries| queries.into_iter().next()).flatten()
}
