//! esmcp-mcp - MCP server implementation
//!
//! This crate exposes Elasticsearch read operations as MCP tools and
//! resources for AI assistants.
//!
//! # Tools
//!
//! - `list_indices` - Page through the index catalog
//! - `get_mappings` - Field mappings of one index
//! - `search` - Query DSL search with automatic highlighting
//! - `search_with_query_string` - Free-text search with paging
//! - `get_index_stats` - Document count, size and operation totals
//!
//! # Resources
//!
//! - `elasticsearch://indices` - Paged index catalog
//! - `elasticsearch://index/{index_name}` - Settings and stats of one index
//! - `elasticsearch://mapping/{index_name}` - Mapping summary of one index

mod context;
pub mod resources;
mod server;
pub mod tools;

pub use context::{AppContext, InvocationContext};
pub use server::EsMcpServer;
pub use tools::{
    GetMappingsParams, IndexStatsParams, ListIndicesParams, QueryStringParams, SearchParams,
    ToolResult,
};
