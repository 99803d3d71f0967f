//! In-memory upstream fakes
//!
//! Available to this crate's tests and, through the `testing` feature, to
//! dependent crates' tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_client::{
    ChromaApi, ClientError, Collection, GetRequest, GetResult, QueryRequest, QueryResult,
};

use crate::registry::{ClientFactory, ClientHandle, UpstreamTarget};

/// Build a collection without metadata
pub fn fake_collection(id: &str, name: &str) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        metadata: None,
    }
}

/// Canned upstream state shared by every handle a `FakeFactory` creates
#[derive(Default)]
pub struct FakeChroma {
    unreachable: bool,
    collections: Vec<Collection>,
    counts: HashMap<String, u64>,
    documents: HashMap<String, GetResult>,
    query_results: HashMap<String, QueryResult>,
    get_requests: Mutex<Vec<GetRequest>>,
    query_requests: Mutex<Vec<QueryRequest>>,
}

impl FakeChroma {
    /// An upstream whose every call fails as unreachable
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Add a collection; a `None` count makes its count call fail
    pub fn with_collection(mut self, collection: Collection, count: Option<u64>) -> Self {
        if let Some(count) = count {
            self.counts.insert(collection.id.clone(), count);
        }
        self.collections.push(collection);
        self
    }

    pub fn with_documents(mut self, collection_id: &str, result: GetResult) -> Self {
        self.documents.insert(collection_id.to_string(), result);
        self
    }

    pub fn with_query_result(mut self, collection_id: &str, result: QueryResult) -> Self {
        self.query_results.insert(collection_id.to_string(), result);
        self
    }

    /// Every `get` body received so far
    pub fn get_requests(&self) -> Vec<GetRequest> {
        self.get_requests.lock().clone()
    }

    /// Every `query` body received so far
    pub fn query_requests(&self) -> Vec<QueryRequest> {
        self.query_requests.lock().clone()
    }

    fn check_reachable(&self) -> Result<(), ClientError> {
        if self.unreachable {
            return Err(ClientError::Unreachable(
                "http://fake:8000: connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

/// A distinct handle over shared fake state
struct FakeHandle {
    chroma: Arc<FakeChroma>,
}

#[async_trait]
impl ChromaApi for FakeHandle {
    async fn heartbeat(&self) -> Result<(), ClientError> {
        self.chroma.check_reachable()
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, ClientError> {
        self.chroma.check_reachable()?;
        Ok(self.chroma.collections.clone())
    }

    async fn get_collection(&self, name: &str) -> Result<Collection, ClientError> {
        self.chroma.check_reachable()?;
        self.chroma
            .collections
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("collection '{}'", name)))
    }

    async fn count(&self, collection_id: &str) -> Result<u64, ClientError> {
        self.chroma.check_reachable()?;
        self.chroma
            .counts
            .get(collection_id)
            .copied()
            .ok_or_else(|| ClientError::Upstream {
                status: 500,
                message: format!("count failed for {}", collection_id),
            })
    }

    async fn get(
        &self,
        collection_id: &str,
        request: &GetRequest,
    ) -> Result<GetResult, ClientError> {
        self.chroma.check_reachable()?;
        self.chroma.get_requests.lock().push(request.clone());
        Ok(self
            .chroma
            .documents
            .get(collection_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn query(
        &self,
        collection_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResult, ClientError> {
        self.chroma.check_reachable()?;
        self.chroma.query_requests.lock().push(request.clone());
        Ok(self
            .chroma
            .query_results
            .get(collection_id)
            .cloned()
            .unwrap_or_default())
    }

    fn base_url(&self) -> &str {
        "http://fake:8000"
    }
}

/// Factory handing out `FakeHandle`s, optionally failing the first calls
pub struct FakeFactory {
    chroma: Arc<FakeChroma>,
    failures_remaining: AtomicUsize,
    connects: AtomicUsize,
    targets: Mutex<Vec<UpstreamTarget>>,
}

impl FakeFactory {
    pub fn new(chroma: FakeChroma) -> Self {
        Self::failing(0, chroma)
    }

    /// Fail the first `failures` connection attempts
    pub fn failing(failures: usize, chroma: FakeChroma) -> Self {
        Self {
            chroma: Arc::new(chroma),
            failures_remaining: AtomicUsize::new(failures),
            connects: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        }
    }

    /// Fail every connection attempt
    pub fn refusing() -> Self {
        Self::failing(usize::MAX, FakeChroma::default())
    }

    pub fn chroma(&self) -> Arc<FakeChroma> {
        self.chroma.clone()
    }

    /// Number of connection attempts, successful or not
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Targets passed to `connect`, in call order
    pub fn targets(&self) -> Vec<UpstreamTarget> {
        self.targets.lock().clone()
    }
}

impl ClientFactory for FakeFactory {
    fn connect(&self, target: &UpstreamTarget) -> Result<ClientHandle, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().push(target.clone());

        let refused = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ClientError::Unreachable(format!(
                "{}:{}: connection refused",
                target.host, target.port
            )));
        }

        Ok(Arc::new(FakeHandle {
            chroma: self.chroma.clone(),
        }))
    }
}
