//! ChromaDB wire types
//!
//! Request and response bodies of the upstream HTTP API. Response columns
//! are kept optional at every level because the upstream omits columns that
//! were not requested and fills individual entries with `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to collections and records
pub type Metadata = Map<String, Value>;

/// A collection as returned by the upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Columns that can be requested from `get` and `query`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Documents,
    Metadatas,
    Embeddings,
    Distances,
}

/// Body of `POST .../collections/{id}/get`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub include: Vec<Include>,
}

/// Response of `POST .../collections/{id}/get`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetResult {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default)]
    pub embeddings: Option<Vec<Option<Vec<f64>>>>,
}

/// Body of `POST .../collections/{id}/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_texts: Vec<String>,
    pub n_results: u32,
    pub include: Vec<Include>,
}

/// Response of `POST .../collections/{id}/query`
///
/// Every column is nested one level per query text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Option<Vec<Option<String>>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Vec<Option<Metadata>>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Option<Vec<Option<f64>>>>>,
}
