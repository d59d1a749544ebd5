//! MCP server implementation.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, Implementation, ListResourceTemplatesResult,
    ListResourcesResult, PaginatedRequestParam, RawResource, ReadResourceRequestParam,
    ReadResourceResult, ResourceContents, ResourceTemplate, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::json;
use tracing::{debug, info};

use esmcp_cluster::ClusterHandle;

use crate::context::AppContext;
use crate::resources::{self, INDEX_TEMPLATE, INDICES_URI, MAPPING_TEMPLATE, MIME_TYPE};
use crate::tools::{
    self, GetMappingsParams, IndexStatsParams, ListIndicesParams, QueryStringParams,
    SearchParams, ToolResult,
};

const INSTRUCTIONS: &str = "Read-only access to an Elasticsearch cluster. Use 'list_indices' to \
discover indices, 'get_mappings' to learn their fields, then 'search' with query DSL or \
'search_with_query_string' for free text. Resources under elasticsearch:// expose the index \
catalog, index settings and mapping summaries as JSON.";

/// Elasticsearch MCP server.
#[derive(Clone)]
pub struct EsMcpServer {
    ctx: AppContext,
    tool_router: ToolRouter<Self>,
}

impl EsMcpServer {
    /// Create a server over an already connected cluster.
    pub fn new(cluster: ClusterHandle, default_page_size: usize) -> Self {
        info!("Initializing Elasticsearch MCP server");
        Self {
            ctx: AppContext::new(cluster, default_page_size),
            tool_router: Self::tool_router(),
        }
    }
}

fn into_call_result(result: ToolResult) -> CallToolResult {
    let content = vec![Content::text(result.message)];
    if result.success {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    }
}

#[tool_router]
impl EsMcpServer {
    #[tool(description = "List all available Elasticsearch indices with pagination support. Returns index name, health, status, document count and size.")]
    pub async fn list_indices(
        &self,
        Parameters(params): Parameters<ListIndicesParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::list_indices(&self.ctx, params).await;
        Ok(into_call_result(ToolResult::from_result("list_indices", result)))
    }

    #[tool(description = "Get field mappings for a specific Elasticsearch index.")]
    pub async fn get_mappings(
        &self,
        Parameters(params): Parameters<GetMappingsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::get_mappings(&self.ctx, params).await;
        Ok(into_call_result(ToolResult::from_result("get_mappings", result)))
    }

    #[tool(description = "Perform an Elasticsearch search with the provided query DSL. Highlights are added automatically for text and vector fields.")]
    pub async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::search(&self.ctx, params).await;
        Ok(into_call_result(ToolResult::from_result("search", result)))
    }

    #[tool(description = "Search an index using Lucene query string syntax, with optional field selection and offset pagination.")]
    pub async fn search_with_query_string(
        &self,
        Parameters(params): Parameters<QueryStringParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::search_with_query_string(&self.ctx, params).await;
        Ok(into_call_result(ToolResult::from_result(
            "search_with_query_string",
            result,
        )))
    }

    #[tool(description = "Get document count, store size and operation totals for an index.")]
    pub async fn get_index_stats(
        &self,
        Parameters(params): Parameters<IndexStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = tools::get_index_stats(&self.ctx, params).await;
        Ok(into_call_result(ToolResult::from_result("get_index_stats", result)))
    }
}

fn resource_template(uri_template: &str, name: &str, description: &str) -> Result<ResourceTemplate, McpError> {
    serde_json::from_value(json!({
        "uriTemplate": uri_template,
        "name": name,
        "description": description,
        "mimeType": MIME_TYPE,
    }))
    .map_err(|e| McpError::internal_error(format!("Invalid resource template: {}", e), None))
}

#[tool_handler]
impl ServerHandler for EsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut indices = RawResource::new(INDICES_URI, "indices");
        indices.description =
            Some("Paged index catalog. Accepts ?page=<n>&page_size=<n>.".to_string());
        indices.mime_type = Some(MIME_TYPE.to_string());

        Ok(ListResourcesResult::with_all_items(vec![indices.no_annotation()]))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = vec![
            resource_template(
                INDEX_TEMPLATE,
                "index",
                "Settings and primary stats of one index.",
            )?,
            resource_template(
                MAPPING_TEMPLATE,
                "mapping",
                "Mappings of one index with a field-type summary.",
            )?,
        ];
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!("Reading resource {}", request.uri);
        let text = resources::read(&self.ctx, &request.uri).await;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
