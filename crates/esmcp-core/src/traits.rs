//! Core traits defining the interfaces between components.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{IndexDescriptor, IndexStats, SearchResponse};

/// Read-only view of a search cluster.
///
/// Every operation re-fetches from the cluster; implementations must not
/// cache metadata.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Liveness check. `Ok(false)` means the cluster answered but is not usable.
    async fn ping(&self) -> Result<bool>;

    /// The full index catalog, in cluster order.
    async fn list_indices(&self) -> Result<Vec<IndexDescriptor>>;

    /// Whether the index exists.
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// The `mappings` object of one index.
    async fn get_mapping(&self, index: &str) -> Result<Value>;

    /// Mappings to derive per-field behavior from. A name that resolves to
    /// several indices (an alias or pattern) yields the union of their
    /// top-level `properties`.
    async fn field_mappings(&self, index: &str) -> Result<Value> {
        self.get_mapping(index).await
    }

    /// The `settings` object of one index.
    async fn get_settings(&self, index: &str) -> Result<Value>;

    /// Primary-shard statistics of one index.
    async fn index_stats(&self, index: &str) -> Result<IndexStats>;

    /// Run a search with a complete request body against one index.
    async fn search(&self, index: &str, body: Map<String, Value>) -> Result<SearchResponse>;

    /// Shutdown hook, called once by the owner of the handle, possibly from
    /// `Drop`. Backends whose resources are freed on drop need nothing here.
    fn close(&self) {}
}
