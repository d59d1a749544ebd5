//! Tool operations.
//!
//! Each operation takes the application context and typed parameters and
//! returns a `Result<String>`. [`ToolResult::from_result`] is the one place
//! where errors become caller-visible text.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use esmcp_core::{EsMcpError, Result};
use esmcp_format::{
    highlight_block, highlight_fields, paginate_indices, render_index_page, render_index_stats,
    render_mappings, render_query_string_results, render_search, PageRequest,
};

use crate::context::AppContext;

/// Sentinel for "return the whole source".
pub const ALL_FIELDS: &str = "_source";

/// `list_indices` parameters.
#[derive(Debug, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ListIndicesParams {
    /// Page number, starting at 1 (default: 1).
    #[serde(default)]
    pub page: Option<i64>,

    /// Number of indices per page (default: 10).
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// `get_mappings` parameters.
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct GetMappingsParams {
    /// Name of the Elasticsearch index to get mappings for.
    pub index: String,
}

/// `search` parameters.
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SearchParams {
    /// Name of the Elasticsearch index to search.
    pub index: String,

    /// Complete Elasticsearch query DSL object that can include query, size, from, sort, etc.
    pub query_body: Map<String, Value>,
}

/// `search_with_query_string` parameters.
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct QueryStringParams {
    /// The name of the index to search.
    pub index_name: String,

    /// Free text search query.
    pub query_text: String,

    /// Comma-separated list of fields to return (default: all).
    #[serde(default = "default_fields")]
    pub fields: String,

    /// Number of results to return (default: 10).
    #[serde(default = "default_size")]
    pub size: u64,

    /// Starting offset for pagination (default: 0).
    #[serde(rename = "from_", alias = "from", default)]
    pub from: u64,
}

impl QueryStringParams {
    pub fn new(index_name: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            query_text: query_text.into(),
            fields: default_fields(),
            size: default_size(),
            from: 0,
        }
    }
}

fn default_fields() -> String {
    ALL_FIELDS.to_string()
}

fn default_size() -> u64 {
    10
}

/// `get_index_stats` parameters.
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct IndexStatsParams {
    /// The name of the index to get statistics for.
    pub index_name: String,
}

/// Tool result.
#[derive(Debug, Serialize)]
pub struct ToolResult {
    /// Whether the operation was successful.
    pub success: bool,

    /// Result text, or `Error: <message>` on failure.
    pub message: String,
}

impl ToolResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: format!("Error: {}", message.into()),
        }
    }

    /// Convert an operation result into what the caller sees.
    pub fn from_result(tool: &str, result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::success(text),
            Err(e) => {
                warn!("Tool {} failed [{}]: {}", tool, e.error_code(), e);
                Self::error(e.to_string())
            }
        }
    }
}

fn require_index(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EsMcpError::invalid_query("index name must not be empty"));
    }
    Ok(name)
}

/// Page through the index catalog, sorted by name.
pub async fn list_indices(ctx: &AppContext, params: ListIndicesParams) -> Result<String> {
    let request = PageRequest::from_raw(params.page, params.page_size, ctx.default_page_size());
    info!(
        "Listing indices (page {}, page size {})",
        request.page, request.page_size
    );

    let indices = ctx.cluster().list_indices().await?;
    let page = paginate_indices(indices, request);
    render_index_page(&page)
}

/// Raw field mappings of one index.
pub async fn get_mappings(ctx: &AppContext, params: GetMappingsParams) -> Result<String> {
    let index = require_index(&params.index)?;
    info!("Getting mappings for {}", index);

    let mappings = ctx.cluster().get_mapping(index).await?;
    render_mappings(index, &mappings)
}

/// Query DSL search, highlighting every free-text or vector field.
pub async fn search(ctx: &AppContext, params: SearchParams) -> Result<String> {
    let index = require_index(&params.index)?;
    info!("Searching {}", index);

    let mappings = ctx.cluster().field_mappings(index).await?;
    let fields = highlight_fields(&mappings);

    let mut body = params.query_body;
    // The index is addressed by path, never by body.
    body.remove("index");
    match highlight_block(&fields) {
        Some(block) => {
            body.insert("highlight".to_string(), block);
        }
        None => debug!("No highlightable fields in {}", index),
    }

    // Echoed in the header only; the cluster validates it.
    let from = match body.get("from") {
        None => "0".to_string(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(value) => value.to_string(),
    };

    let response = ctx.cluster().search(index, body).await?;
    render_search(&response, from)
}

/// Free-text search with `query_string` syntax and offset paging.
pub async fn search_with_query_string(
    ctx: &AppContext,
    params: QueryStringParams,
) -> Result<String> {
    let index = require_index(&params.index_name)?;
    info!("Query string search on {}: {:?}", index, params.query_text);

    let mut body = Map::new();
    body.insert(
        "query".to_string(),
        json!({"query_string": {"query": params.query_text}}),
    );
    body.insert("size".to_string(), json!(params.size));
    body.insert("from".to_string(), json!(params.from));

    let fields = params.fields.trim();
    if !fields.is_empty() && fields != ALL_FIELDS {
        let selected: Vec<&str> = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        body.insert("_source".to_string(), json!(selected));
    }

    let response = ctx.cluster().search(index, body).await?;
    render_query_string_results(&response, params.from, params.size)
}

/// Document count, store size and operation totals of one index.
pub async fn get_index_stats(ctx: &AppContext, params: IndexStatsParams) -> Result<String> {
    let index = require_index(&params.index_name)?;
    info!("Getting stats for {}", index);

    let stats = ctx.cluster().index_stats(index).await?;
    Ok(render_index_stats(index, &stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use esmcp_cluster::{MemoryCluster, MemoryIndex};
    use esmcp_core::{Hit, IndexStats, SearchResponse};

    fn context(cluster: Arc<MemoryCluster>) -> AppContext {
        AppContext::new(cluster, 10)
    }

    fn source(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn articles() -> MemoryIndex {
        let hit = Hit::new(
            "1",
            3.2,
            source(json!({"title": "Rust in action", "price": 39.5})),
        )
        .with_highlight("title", vec!["<em>Rust</em> in action".to_string()]);

        MemoryIndex::new("articles")
            .with_docs(25)
            .with_mappings(json!({
                "properties": {
                    "title": {"type": "text"},
                    "price": {"type": "float"}
                }
            }))
            .with_search_response(SearchResponse::from_hits(1, vec![hit]))
    }

    fn products() -> MemoryIndex {
        MemoryIndex::new("products").with_mappings(json!({
            "properties": {
                "sku": {"type": "keyword"},
                "price": {"type": "float"}
            }
        }))
    }

    #[tokio::test]
    async fn test_list_indices_single_index() {
        let cluster = Arc::new(MemoryCluster::new().with_index(articles()));
        let ctx = context(cluster);

        let params = ListIndicesParams {
            page: Some(3),
            page_size: Some(10),
        };
        let text = list_indices(&ctx, params).await.unwrap();
        assert!(text.starts_with("Found 1 indices (page 1 of 1, showing 1)"));

        let digest: Value = serde_json::from_str(text.split_once("\n\n").unwrap().1).unwrap();
        assert_eq!(digest["current_page"], json!(1));
        assert_eq!(digest["indices"][0]["index"], json!("articles"));
        assert_eq!(digest["indices"][0]["docs_count"], json!(25));
    }

    #[tokio::test]
    async fn test_list_indices_last_page() {
        let mut cluster = MemoryCluster::new();
        for i in 0..25 {
            cluster = cluster.with_index(MemoryIndex::new(format!("logs-{:02}", 24 - i)));
        }
        let ctx = context(Arc::new(cluster));

        let params = ListIndicesParams {
            page: Some(3),
            page_size: Some(10),
        };
        let text = list_indices(&ctx, params).await.unwrap();
        let digest: Value = serde_json::from_str(text.split_once("\n\n").unwrap().1).unwrap();

        assert_eq!(digest["current_page"], json!(3));
        assert_eq!(digest["total_pages"], json!(3));
        assert_eq!(digest["indices_on_page"], json!(5));
        assert_eq!(digest["indices"][0]["index"], json!("logs-20"));
    }

    #[tokio::test]
    async fn test_list_indices_empty() {
        let ctx = context(Arc::new(MemoryCluster::new()));
        let text = list_indices(&ctx, ListIndicesParams::default()).await.unwrap();
        assert_eq!(text, "No indices found.");
    }

    #[tokio::test]
    async fn test_get_mappings() {
        let ctx = context(Arc::new(MemoryCluster::new().with_index(articles())));
        let params = GetMappingsParams {
            index: "articles".to_string(),
        };
        let text = get_mappings(&ctx, params).await.unwrap();
        assert!(text.starts_with("Mappings for index: articles\n\n"));
        assert!(text.contains("\"title\""));

        let missing = GetMappingsParams {
            index: "nope".to_string(),
        };
        let result = ToolResult::from_result("get_mappings", get_mappings(&ctx, missing).await);
        assert!(!result.success);
        assert_eq!(result.message, "Error: Index 'nope' does not exist");
    }

    #[tokio::test]
    async fn test_search_adds_highlight_for_text_fields() {
        let cluster = Arc::new(MemoryCluster::new().with_index(articles()));
        let ctx = context(cluster.clone());

        let params = SearchParams {
            index: "articles".to_string(),
            query_body: source(json!({"query": {"match": {"title": "rust"}}, "from": 0})),
        };
        let text = search(&ctx, params).await.unwrap();

        let searches = cluster.recorded_searches();
        let body = &searches[0].1;
        assert_eq!(
            body["highlight"],
            json!({"fields": {"title": {}}, "pre_tags": ["<em>"], "post_tags": ["</em>"]})
        );
        assert_eq!(body["query"], json!({"match": {"title": "rust"}}));

        assert!(text.starts_with("Total results: 1, showing 1 from position 0"));
        assert!(text.contains("title (highlighted): <em>Rust</em> in action"));
        assert!(text.contains("price: 39.5"));
        assert!(!text.contains("title: \"Rust in action\""));
    }

    #[tokio::test]
    async fn test_search_without_text_fields_sends_no_highlight() {
        let cluster = Arc::new(MemoryCluster::new().with_index(products()));
        let ctx = context(cluster.clone());

        let params = SearchParams {
            index: "products".to_string(),
            query_body: source(json!({"query": {"match_all": {}}, "index": "other"})),
        };
        search(&ctx, params).await.unwrap();

        let searches = cluster.recorded_searches();
        assert_eq!(searches[0].0, "products");
        assert!(!searches[0].1.contains_key("highlight"));
        assert!(!searches[0].1.contains_key("index"));
    }

    #[tokio::test]
    async fn test_search_passes_string_from_through() {
        let cluster = Arc::new(MemoryCluster::new().with_index(products()));
        let ctx = context(cluster.clone());

        let params = SearchParams {
            index: "products".to_string(),
            query_body: source(json!({"query": {"match_all": {}}, "from": "10"})),
        };
        let text = search(&ctx, params).await.unwrap();

        assert!(text.starts_with("Total results: 0, showing 0 from position 10"));
        let searches = cluster.recorded_searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].1["from"], json!("10"));
    }

    #[tokio::test]
    async fn test_query_string_far_offset() {
        let cluster = Arc::new(MemoryCluster::new().with_index(articles()));
        let ctx = context(cluster);

        let mut params = QueryStringParams::new("articles", "rust");
        params.from = u64::MAX;
        let result = ToolResult::from_result(
            "search_with_query_string",
            search_with_query_string(&ctx, params).await,
        );

        assert!(result.success);
        assert!(result.message.contains(&format!("Result {}.", u64::MAX)));
    }

    #[tokio::test]
    async fn test_query_string_field_projection() {
        let cluster = Arc::new(MemoryCluster::new().with_index(articles()));
        let ctx = context(cluster.clone());

        let mut params = QueryStringParams::new("articles", "rust AND action");
        params.fields = "title, price".to_string();
        params.size = 5;
        params.from = 0;
        let text = search_with_query_string(&ctx, params).await.unwrap();

        let searches = cluster.recorded_searches();
        let body = &searches[0].1;
        assert_eq!(body["_source"], json!(["title", "price"]));
        assert_eq!(body["query"], json!({"query_string": {"query": "rust AND action"}}));
        assert_eq!(body["size"], json!(5));
        assert_eq!(body["from"], json!(0));

        assert!(text.starts_with("Found 1 documents. Showing 1-1:"));
        assert!(text.contains("Result 1. Score: 3.2\nID: 1\nContent:\n"));
    }

    #[tokio::test]
    async fn test_query_string_all_fields() {
        let cluster = Arc::new(MemoryCluster::new().with_index(articles()));
        let ctx = context(cluster.clone());

        search_with_query_string(&ctx, QueryStringParams::new("articles", "rust"))
            .await
            .unwrap();
        assert!(!cluster.recorded_searches()[0].1.contains_key("_source"));
    }

    #[test]
    fn test_query_string_params_defaults() {
        let params: QueryStringParams =
            serde_json::from_value(json!({"index_name": "a", "query_text": "b", "from_": 20}))
                .unwrap();
        assert_eq!(params.fields, "_source");
        assert_eq!(params.size, 10);
        assert_eq!(params.from, 20);
    }

    #[tokio::test]
    async fn test_index_stats() {
        let stats = IndexStats {
            docs_count: 25,
            size_in_bytes: 2_097_152,
            index_total: 25,
            query_total: 3,
        };
        let cluster = MemoryCluster::new().with_index(articles().with_stats(stats));
        let ctx = context(Arc::new(cluster));

        let params = IndexStatsParams {
            index_name: "articles".to_string(),
        };
        let text = get_index_stats(&ctx, params).await.unwrap();
        assert!(text.contains("Documents: 25"));
        assert!(text.contains("Size: 2.00 MB"));
        assert!(text.contains("Search operations: 3"));
    }

    #[tokio::test]
    async fn test_cluster_fault_becomes_error_text() {
        let cluster = MemoryCluster::new()
            .with_index(articles())
            .failing("connection refused");
        let ctx = context(Arc::new(cluster));

        let results = vec![
            ToolResult::from_result(
                "list_indices",
                list_indices(&ctx, ListIndicesParams::default()).await,
            ),
            ToolResult::from_result(
                "search",
                search(
                    &ctx,
                    SearchParams {
                        index: "articles".to_string(),
                        query_body: Map::new(),
                    },
                )
                .await,
            ),
            ToolResult::from_result(
                "get_index_stats",
                get_index_stats(
                    &ctx,
                    IndexStatsParams {
                        index_name: "articles".to_string(),
                    },
                )
                .await,
            ),
        ];

        for result in results {
            assert!(!result.success);
            assert!(result.message.starts_with("Error"), "{}", result.message);
            assert!(result.message.contains("connection refused"));
        }
    }

    #[tokio::test]
    async fn test_empty_index_name() {
        let ctx = context(Arc::new(MemoryCluster::new()));
        let params = GetMappingsParams {
            index: "  ".to_string(),
        };
        let err = get_mappings(&ctx, params).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY");
    }
}
