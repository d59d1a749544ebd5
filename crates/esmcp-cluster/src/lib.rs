//! esmcp-cluster - Cluster connection lifecycle
//!
//! This crate connects to Elasticsearch, verifies the cluster is reachable,
//! and owns the shared handle until shutdown.
//!
//! # Backends
//!
//! - `EsCluster` - the official `elasticsearch` client
//! - `MemoryCluster` - an in-memory cluster for tests

mod elastic;
mod lifecycle;
mod memory;

pub use elastic::{ConnectOptions, EsCluster};
pub use lifecycle::{ClusterHandle, Lifespan};
pub use memory::{MemoryCluster, MemoryIndex};

// Re-export the Cluster trait for convenience
pub use esmcp_core::Cluster;
