//! Collection routes

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, PathRejection, QueryRejection},
    },
    routing::{get, post},
};
use bytes::Bytes;
use relay_core::models::DEFAULT_DOCUMENT_LIMIT;
use relay_core::{CollectionDescriptor, CoreError, DocumentRecord, SearchRequest, SearchResult};
use serde::Deserialize;
use tracing::debug;

use super::{UpstreamQuery, rejected, respond};
use crate::error::ApiError;
use crate::state::AppState;

type NameParam = Result<Path<String>, PathRejection>;

/// Query parameters for document fetches
#[derive(Debug, Default, Deserialize)]
pub struct DocumentsQuery {
    pub url: Option<String>,
    pub port: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub limit: Option<String>,
}

/// Parse the `limit` parameter, defaulting when absent
fn parse_limit(limit: Option<&str>) -> Result<u32, CoreError> {
    match limit {
        None => Ok(DEFAULT_DOCUMENT_LIMIT),
        Some(value) => value.trim().parse().map_err(|_| {
            CoreError::InvalidRequest(format!(
                "limit must be a non-negative integer, got '{}'",
                value
            ))
        }),
    }
}

/// Parse a search body; an empty body means all defaults
fn parse_search_body(body: &[u8]) -> Result<SearchRequest, CoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SearchRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| CoreError::InvalidRequest(format!("invalid search body: {}", e)))
}

/// GET /collections
async fn list_collections(
    State(state): State<AppState>,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
) -> Result<Json<Vec<CollectionDescriptor>>, ApiError> {
    respond("list_collections", list(&state, query).await)
}

async fn list(
    state: &AppState,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
) -> Result<Vec<CollectionDescriptor>, CoreError> {
    let Query(query) = query.map_err(rejected)?;
    let address = state.address(query.url, query.port, query.api_key);
    debug!("List collections: {}:{}", address.host, address.port);

    state.relay.list_collections(&address).await
}

/// GET /collections/{name}/documents
async fn get_documents(
    State(state): State<AppState>,
    name: NameParam,
    query: Result<Query<DocumentsQuery>, QueryRejection>,
) -> Result<Json<Vec<DocumentRecord>>, ApiError> {
    respond("get_documents", documents(&state, name, query).await)
}

async fn documents(
    state: &AppState,
    name: NameParam,
    query: Result<Query<DocumentsQuery>, QueryRejection>,
) -> Result<Vec<DocumentRecord>, CoreError> {
    let Path(name) = name.map_err(rejected)?;
    let Query(query) = query.map_err(rejected)?;
    let limit = parse_limit(query.limit.as_deref())?;
    let address = state.address(query.url, query.port, query.api_key);
    debug!("Get documents: {} on {}:{}", name, address.host, address.port);

    state.relay.get_documents(&address, &name, limit).await
}

/// POST /collections/{name}/search
async fn search(
    State(state): State<AppState>,
    name: NameParam,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    respond("search", nearest(&state, name, query, body).await)
}

async fn nearest(
    state: &AppState,
    name: NameParam,
    query: Result<Query<UpstreamQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Vec<SearchResult>, CoreError> {
    let Path(name) = name.map_err(rejected)?;
    let Query(query) = query.map_err(rejected)?;
    let request = parse_search_body(&body.map_err(rejected)?)?;
    let address = state.address(query.url, query.port, query.api_key);
    debug!("Search: {} on {}:{}", name, address.host, address.port);

    state.relay.search(&address, &name, request).await
}

/// Create collection routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/{name}/documents", get(get_documents))
        .route("/collections/{name}/search", post(search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), 100);
        assert_eq!(parse_limit(Some("25")).unwrap(), 25);
        assert!(parse_limit(Some("ten")).is_err());
        assert!(parse_limit(Some("-1")).is_err());
    }

    #[test]
    fn test_parse_search_body() {
        assert_eq!(parse_search_body(b"").unwrap(), SearchRequest::default());
        assert_eq!(parse_search_body(b"  \n").unwrap(), SearchRequest::default());

        let request = parse_search_body(br#"{"query":"hello"}"#).unwrap();
        assert_eq!(request.query, "hello");
        assert_eq!(request.limit, 10);

        assert!(matches!(
            parse_search_body(b"{not json"),
            Err(CoreError::InvalidRequest(_))
        ));
    }
}
