//! Resource addressing.
//!
//! Resources live under the `elasticsearch://` scheme and always answer with
//! a JSON document. On failure the document is `{"error": <message>}`.

use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use esmcp_core::{EsMcpError, Result};
use esmcp_format::{paginate_indices, round_mib, summarize_mappings, PageRequest};

use crate::context::{AppContext, InvocationContext};

pub const SCHEME: &str = "elasticsearch";

pub const INDICES_URI: &str = "elasticsearch://indices";
pub const INDEX_TEMPLATE: &str = "elasticsearch://index/{index_name}";
pub const MAPPING_TEMPLATE: &str = "elasticsearch://mapping/{index_name}";

pub const MIME_TYPE: &str = "application/json";

/// What a resource URI points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    /// Paged index catalog.
    Indices,
    /// Settings and stats of one index.
    Index(String),
    /// Mapping summary of one index.
    Mapping(String),
}

/// Parse a resource URI into its address and the parameters carried in its
/// query string.
pub fn parse_uri(uri: &str) -> Result<(ResourceAddress, InvocationContext)> {
    let url = Url::parse(uri)
        .map_err(|e| EsMcpError::invalid_query(format!("Invalid resource URI '{}': {}", uri, e)))?;
    if url.scheme() != SCHEME {
        return Err(unknown(uri));
    }

    let kind = url.host_str().unwrap_or_default();
    let path = urlencoding::decode(url.path().trim_matches('/')).map_err(|e| {
        EsMcpError::invalid_query(format!("Invalid resource URI '{}': {}", uri, e))
    })?;

    let address = match (kind, path.as_ref()) {
        ("indices", "") => ResourceAddress::Indices,
        ("index", name) if is_single_segment(name) => ResourceAddress::Index(name.to_string()),
        ("mapping", name) if is_single_segment(name) => ResourceAddress::Mapping(name.to_string()),
        _ => return Err(unknown(uri)),
    };

    let context = InvocationContext::from_pairs(url.query_pairs().into_owned());
    Ok((address, context))
}

fn is_single_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}

fn unknown(uri: &str) -> EsMcpError {
    EsMcpError::invalid_query(format!("Unknown resource URI: {}", uri))
}

/// Read a resource. Never fails: any fault becomes an error document.
pub async fn read(ctx: &AppContext, uri: &str) -> String {
    let result = match parse_uri(uri) {
        Ok((address, invocation)) => resolve(ctx, &address, &invocation).await,
        Err(e) => Err(e),
    };

    let document = result.unwrap_or_else(|e| {
        warn!("Resource {} failed [{}]: {}", uri, e.error_code(), e);
        json!({"error": e.to_string()})
    });
    document.to_string()
}

async fn resolve(
    ctx: &AppContext,
    address: &ResourceAddress,
    invocation: &InvocationContext,
) -> Result<Value> {
    match address {
        ResourceAddress::Indices => indices_list(ctx, invocation).await,
        ResourceAddress::Index(name) => index_info(ctx, name).await,
        ResourceAddress::Mapping(name) => mapping_info(ctx, name).await,
    }
}

async fn require_existing(ctx: &AppContext, name: &str) -> Result<()> {
    if ctx.cluster().index_exists(name).await? {
        Ok(())
    } else {
        Err(EsMcpError::index_not_found(name))
    }
}

/// Settings and primary stats of one index.
pub async fn index_info(ctx: &AppContext, name: &str) -> Result<Value> {
    info!("Reading index resource {}", name);
    require_existing(ctx, name).await?;

    let settings = ctx.cluster().get_settings(name).await?;
    let stats = ctx.cluster().index_stats(name).await?;

    Ok(json!({
        "name": name,
        "settings": settings,
        "stats": {
            "docs_count": stats.docs_count,
            "size_bytes": stats.size_in_bytes,
            "size_mb": round_mib(stats.size_in_bytes),
        }
    }))
}

/// Raw mappings of one index plus a field-type histogram.
pub async fn mapping_info(ctx: &AppContext, name: &str) -> Result<Value> {
    info!("Reading mapping resource {}", name);
    require_existing(ctx, name).await?;

    let mappings = ctx.cluster().get_mapping(name).await?;
    let summary = summarize_mappings(&mappings);

    Ok(json!({
        "index": name,
        "mappings": mappings,
        "field_count": summary.field_count,
        "field_types": summary.field_types,
    }))
}

/// One page of the index catalog, paged by `page` and `page_size`.
pub async fn indices_list(ctx: &AppContext, invocation: &InvocationContext) -> Result<Value> {
    let request = PageRequest::from_text(
        invocation.get("page"),
        invocation.get("page_size"),
        ctx.default_page_size(),
    );
    info!(
        "Reading indices resource (page {}, page size {})",
        request.page, request.page_size
    );

    let indices = ctx.cluster().list_indices().await?;
    Ok(serde_json::to_value(paginate_indices(indices, request))?)
}
