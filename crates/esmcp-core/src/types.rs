//! Core domain types for es-mcp.
//!
//! These mirror the subset of Elasticsearch responses the server reads. The
//! official client returns untyped JSON, so the shapes are declared here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One row of the index catalog (`_cat/indices`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub index: String,

    /// Health colour (green, yellow, red).
    #[serde(default)]
    pub health: Option<String>,

    /// Open or close.
    #[serde(default)]
    pub status: Option<String>,

    /// Document count. Absent for closed indices.
    #[serde(
        rename(serialize = "docs_count", deserialize = "docs.count"),
        default,
        deserialize_with = "deserialize_option_number_from_string"
    )]
    pub docs_count: Option<u64>,

    /// Human-readable store size, e.g. `4.5kb`.
    #[serde(
        rename(serialize = "size", deserialize = "store.size"),
        default
    )]
    pub size: Option<String>,
}

impl IndexDescriptor {
    /// Create a descriptor for an open, green index.
    pub fn new(index: impl Into<String>, docs_count: u64, size: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            health: Some("green".to_string()),
            status: Some("open".to_string()),
            docs_count: Some(docs_count),
            size: Some(size.into()),
        }
    }
}

/// Response of `GET <index>/_mapping`, keyed by concrete index name.
pub type MappingsResponse = HashMap<String, IndexMappings>;

/// Mapping entry for one index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMappings {
    #[serde(default)]
    pub mappings: Value,
}

/// Total hit count. Elasticsearch reports either a bare number (legacy)
/// or an object with a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    /// The hit count regardless of representation.
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(value) => *value,
            Self::Object { value, .. } => *value,
        }
    }
}

/// Search response (only the parts this server renders).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,
}

impl SearchResponse {
    /// Build a response from hits, with an object-form total.
    pub fn from_hits(total: u64, hits: Vec<Hit>) -> Self {
        Self {
            hits: Hits {
                total: Some(TotalHits::Object {
                    value: total,
                    relation: Some("eq".to_string()),
                }),
                hits,
            },
        }
    }

    /// Total hit count, if the cluster reported one.
    pub fn total(&self) -> Option<u64> {
        self.hits.total.as_ref().map(TotalHits::value)
    }
}

/// The `hits` section of a search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,

    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// A single search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    /// Source document, in the cluster's key order.
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,

    /// Highlighted fragments per field.
    #[serde(default)]
    pub highlight: IndexMap<String, Vec<String>>,
}

impl Hit {
    pub fn new(id: impl Into<String>, score: f64, source: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            score: Some(score),
            source,
            highlight: IndexMap::new(),
        }
    }

    pub fn with_highlight(mut self, field: impl Into<String>, fragments: Vec<String>) -> Self {
        self.highlight.insert(field.into(), fragments);
        self
    }
}

/// Aggregate statistics of one index (primaries only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub docs_count: u64,
    pub size_in_bytes: u64,
    pub index_total: u64,
    pub query_total: u64,
}

impl IndexStats {
    /// Store size in MiB.
    pub fn size_mib(&self) -> f64 {
        self.size_in_bytes as f64 / 1024.0 / 1024.0
    }
}

/// Response of `GET <index>/_stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicesStatsResponse {
    #[serde(rename = "_all")]
    pub all: StatsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsSection {
    pub primaries: PrimaryStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryStats {
    #[serde(default)]
    pub docs: DocsStats,
    #[serde(default)]
    pub store: StoreStats,
    #[serde(default)]
    pub indexing: IndexingStats,
    #[serde(default)]
    pub search: SearchStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsStats {
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreStats {
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub size_in_bytes: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexingStats {
    #[serde(default)]
    pub index_total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchStats {
    #[serde(default)]
    pub query_total: u64,
}

impl From<IndicesStatsResponse> for IndexStats {
    fn from(response: IndicesStatsResponse) -> Self {
        let primaries = response.all.primaries;
        Self {
            docs_count: primaries.docs.count,
            size_in_bytes: primaries.store.size_in_bytes,
            index_total: primaries.indexing.index_total,
            query_total: primaries.search.query_total,
        }
    }
}
