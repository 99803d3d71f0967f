//! ChromaDB HTTP client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::api::ChromaApi;
use crate::error::ClientError;
use crate::types::{Collection, GetRequest, GetResult, QueryRequest, QueryResult};

/// ChromaDB client configuration
#[derive(Clone, Debug)]
pub struct ChromaClientConfig {
    /// Host name or address, without scheme
    pub host: String,
    /// HTTP port of the upstream
    pub port: u16,
    /// Tenant that owns the database
    pub tenant: String,
    /// Database holding the collections
    pub database: String,
    /// Token sent as a bearer credential
    pub credential: Option<String>,
    /// Connect over HTTPS instead of plain HTTP
    pub tls: bool,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// ChromaDB API client bound to one upstream server
pub struct ChromaClient {
    config: ChromaClientConfig,
    base: Url,
    base_url: String,
    client: Client,
}

impl ChromaClient {
    /// Create a new ChromaDB client
    ///
    /// No request is made here; an unreachable upstream surfaces on the
    /// first call.
    pub fn new(config: ChromaClientConfig) -> Result<Self, ClientError> {
        if config.host.is_empty() {
            return Err(ClientError::InvalidTarget("host must not be empty".to_string()));
        }

        let scheme = if config.tls { "https" } else { "http" };
        let base = Url::parse(&format!("{}://{}:{}", scheme, config.host, config.port))
            .map_err(|e| {
                ClientError::InvalidTarget(format!("{}:{}: {}", config.host, config.port, e))
            })?;
        let base_url = base.as_str().trim_end_matches('/').to_string();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!("Created ChromaDB client for {}", base_url);

        Ok(Self {
            config,
            base,
            base_url,
            client,
        })
    }

    /// Build an upstream URL from percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidTarget(self.base_url.clone()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    /// URL below `/api/v2/tenants/{tenant}/databases/{database}/collections`
    fn collections_url(&self, rest: &[&str]) -> Result<Url, ClientError> {
        let mut segments = vec![
            "api",
            "v2",
            "tenants",
            self.config.tenant.as_str(),
            "databases",
            self.config.database.as_str(),
            "collections",
        ];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    /// Send a request, mapping transport failures and non-2xx statuses
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ClientError> {
        let request = match &self.config.credential {
            Some(credential) => request.bearer_auth(credential),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Unreachable(format!("{}: {}", self.base_url, e)))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChromaApi for ChromaClient {
    async fn heartbeat(&self) -> Result<(), ClientError> {
        let url = self.url(&["api", "v2", "heartbeat"])?;
        debug!("Heartbeat: {}", url);

        self.send(self.client.get(url), "heartbeat").await?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, ClientError> {
        let url = self.collections_url(&[])?;
        debug!("Listing collections: {}", url);

        let response = self.send(self.client.get(url), "collections").await?;
        Self::decode(response).await
    }

    async fn get_collection(&self, name: &str) -> Result<Collection, ClientError> {
        let url = self.collections_url(&[name])?;
        debug!("Resolving collection: {}", url);

        let response = self
            .send(self.client.get(url), &format!("collection '{}'", name))
            .await?;
        Self::decode(response).await
    }

    async fn count(&self, collection_id: &str) -> Result<u64, ClientError> {
        let url = self.collections_url(&[collection_id, "count"])?;
        debug!("Counting collection: {}", url);

        let response = self
            .send(self.client.get(url), &format!("collection {}", collection_id))
            .await?;
        Self::decode(response).await
    }

    async fn get(
        &self,
        collection_id: &str,
        request: &GetRequest,
    ) -> Result<GetResult, ClientError> {
        let url = self.collections_url(&[collection_id, "get"])?;
        debug!("Fetching records: {}", url);

        let response = self
            .send(
                self.client.post(url).json(request),
                &format!("collection {}", collection_id),
            )
            .await?;
        Self::decode(response).await
    }

    async fn query(
        &self,
        collection_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResult, ClientError> {
        let url = self.collections_url(&[collection_id, "query"])?;
        debug!("Querying collection: {}", url);

        let response = self
            .send(
                self.client.post(url).json(request),
                &format!("collection {}", collection_id),
            )
            .await?;
        Self::decode(response).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Include;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COLLECTIONS: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

    fn create_test_client(server: &MockServer, credential: Option<&str>) -> ChromaClient {
        let address = server.address();
        ChromaClient::new(ChromaClientConfig {
            host: address.ip().to_string(),
            port: address.port(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            credential: credential.map(|c| c.to_string()),
            tls: false,
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_host() {
        let result = ChromaClient::new(ChromaClientConfig {
            host: String::new(),
            port: 8000,
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            credential: None,
            tls: false,
            timeout: None,
        });
        assert!(matches!(result, Err(ClientError::InvalidTarget(_))));
    }

    #[test]
    fn test_base_url() {
        let client = ChromaClient::new(ChromaClientConfig {
            host: "chroma.internal".to_string(),
            port: 8000,
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            credential: None,
            tls: false,
            timeout: None,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://chroma.internal:8000");
    }

    #[test]
    fn test_base_url_with_tls() {
        let client = ChromaClient::new(ChromaClientConfig {
            host: "chroma.internal".to_string(),
            port: 8443,
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            credential: None,
            tls: true,
            timeout: None,
        })
        .unwrap();
        assert_eq!(client.base_url(), "https://chroma.internal:8443");
    }

    #[tokio::test]
    async fn test_heartbeat() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/heartbeat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"nanosecond heartbeat": 1})),
            )
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        assert!(client.heartbeat().await.is_ok());
    }

    #[tokio::test]
    async fn test_no_authorization_without_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/heartbeat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        client.heartbeat().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_credential_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(COLLECTIONS))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "c1", "name": "docs", "metadata": {"owner": "ana"}},
                {"id": "c2", "name": "notes", "metadata": null}
            ])))
            .mount(&server)
            .await;

        let client = create_test_client(&server, Some("secret"));
        let collections = client.list_collections().await.unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].name, "docs");
        assert!(collections[1].metadata.is_none());
    }

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/missing", COLLECTIONS)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "NotFoundError",
                "message": "Collection [missing] does not exists"
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        let err = client.get_collection("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/c1/count", COLLECTIONS)))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        match client.count("c1").await {
            Err(ClientError::Upstream { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_sends_limit_and_include() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/c1/get", COLLECTIONS)))
            .and(body_json(json!({
                "limit": 2,
                "include": ["documents", "metadatas", "embeddings"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ids": ["a", "b"],
                "documents": ["alpha", "beta"],
                "metadatas": [{"k": 1}, null],
                "embeddings": [[0.5, 0.25], null]
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        let result = client
            .get(
                "c1",
                &GetRequest {
                    limit: Some(2),
                    include: vec![Include::Documents, Include::Metadatas, Include::Embeddings],
                },
            )
            .await
            .unwrap();

        assert_eq!(result.ids, vec!["a", "b"]);
        assert_eq!(result.embeddings.unwrap()[0], Some(vec![0.5, 0.25]));
    }

    #[tokio::test]
    async fn test_query_returns_nested_columns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/c1/query", COLLECTIONS)))
            .and(body_json(json!({
                "query_texts": ["hello"],
                "n_results": 2,
                "include": ["documents", "metadatas", "distances"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ids": [["a", "b"]],
                "distances": [[0.1, 0.3]]
            })))
            .mount(&server)
            .await;

        let client = create_test_client(&server, None);
        let result = client
            .query(
                "c1",
                &QueryRequest {
                    query_texts: vec!["hello".to_string()],
                    n_results: 2,
                    include: vec![Include::Documents, Include::Metadatas, Include::Distances],
                },
            )
            .await
            .unwrap();

        assert_eq!(result.ids, vec![vec!["a".to_string(), "b".to_string()]]);
        assert!(result.documents.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Bind and drop a listener to obtain a port nothing is serving on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ChromaClient::new(ChromaClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            credential: None,
            tls: false,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();

        let err = client.heartbeat().await.unwrap_err();
        assert!(matches!(err, ClientError::Unreachable(_)));
    }
}
