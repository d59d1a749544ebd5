//! esmcp-format - Response formatting
//!
//! This crate turns raw cluster responses into the text and JSON digests
//! returned to MCP clients.
//!
//! # Features
//!
//! - Page-window arithmetic with clamping of caller input
//! - Highlight field selection from index mappings
//! - Mapping summaries (field count, type histogram)
//! - Text rendering of search hits, catalogs and statistics
//!
//! # Example
//!
//! ```rust,ignore
//! use esmcp_format::{paginate_indices, render_index_page, PageRequest};
//!
//! let request = PageRequest::from_raw(Some(3), Some(10), 10);
//! let page = paginate_indices(indices, request);
//! println!("{}", render_index_page(&page)?);
//! ```

mod highlight;
mod mapping;
mod pagination;
mod render;

pub use highlight::{highlight_block, highlight_fields, POST_TAG, PRE_TAG};
pub use mapping::{summarize_mappings, MappingSummary};
pub use pagination::{paginate_indices, IndexPage, PageRequest, PageWindow, DEFAULT_PAGE};
pub use render::{
    format_mib, render_index_page, render_index_stats, render_mappings,
    render_query_string_results, render_search, round_mib,
};
