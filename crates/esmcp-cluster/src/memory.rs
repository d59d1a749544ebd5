//! In-memory cluster for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use esmcp_core::{Cluster, EsMcpError, IndexDescriptor, IndexStats, Result, SearchResponse};

/// One index held by a [`MemoryCluster`].
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    pub descriptor: IndexDescriptor,
    pub mappings: Value,
    pub settings: Value,
    pub stats: IndexStats,
    /// Returned verbatim by every search against this index.
    pub search_response: SearchResponse,
}

impl MemoryIndex {
    /// An empty, open index with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            descriptor: IndexDescriptor::new(name.clone(), 0, "0b"),
            mappings: json!({}),
            settings: json!({
                "index": {
                    "number_of_shards": "1",
                    "number_of_replicas": "1",
                    "provided_name": name,
                }
            }),
            stats: IndexStats::default(),
            search_response: SearchResponse::from_hits(0, Vec::new()),
        }
    }

    pub fn with_docs(mut self, docs_count: u64) -> Self {
        self.descriptor.docs_count = Some(docs_count);
        self.stats.docs_count = docs_count;
        self
    }

    pub fn with_mappings(mut self, mappings: Value) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_stats(mut self, stats: IndexStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_search_response(mut self, response: SearchResponse) -> Self {
        self.search_response = response;
        self
    }
}

/// A cluster held entirely in memory.
///
/// Records every search body it receives so callers can inspect the
/// outgoing requests.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    indices: Vec<MemoryIndex>,
    unreachable: bool,
    failure: Option<String>,
    searches: Mutex<Vec<(String, Map<String, Value>)>>,
    closes: AtomicUsize,
}

impl MemoryCluster {
    /// Create an empty, reachable cluster.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: MemoryIndex) -> Self {
        self.indices.push(index);
        self
    }

    /// Answer pings with a failure status.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Fail every request (except ping) with a cluster error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Search bodies received so far, with their target index.
    pub fn recorded_searches(&self) -> Vec<(String, Map<String, Value>)> {
        self.searches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(EsMcpError::cluster(message.clone())),
            None => Ok(()),
        }
    }

    fn find(&self, index: &str) -> Result<&MemoryIndex> {
        self.check_failure()?;
        self.indices
            .iter()
            .find(|i| i.descriptor.index == index)
            .ok_or_else(|| EsMcpError::index_not_found(index))
    }
}

#[async_trait]
impl Cluster for MemoryCluster {
    async fn ping(&self) -> Result<bool> {
        Ok(!self.unreachable)
    }

    async fn list_indices(&self) -> Result<Vec<IndexDescriptor>> {
        self.check_failure()?;
        Ok(self.indices.iter().map(|i| i.descriptor.clone()).collect())
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        self.check_failure()?;
        Ok(self.indices.iter().any(|i| i.descriptor.index == index))
    }

    async fn get_mapping(&self, index: &str) -> Result<Value> {
        Ok(self.find(index)?.mappings.clone())
    }

    async fn get_settings(&self, index: &str) -> Result<Value> {
        Ok(self.find(index)?.settings.clone())
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        Ok(self.find(index)?.stats)
    }

    async fn search(&self, index: &str, body: Map<String, Value>) -> Result<SearchResponse> {
        let response = self.find(index)?.search_response.clone();
        self.searches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((index.to_string(), body));
        Ok(response)
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
