//! Cluster backend using the official Elasticsearch client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cat::CatIndicesParts;
use elasticsearch::http::headers::{HeaderValue, USER_AGENT};
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{
    CloudConnectionPool, ConnectionPool, SingleNodeConnectionPool, Transport, TransportBuilder,
};
use elasticsearch::http::Url;
use elasticsearch::indices::{
    IndicesExistsParts, IndicesGetMappingParts, IndicesGetParts, IndicesStatsParts,
};
use elasticsearch::{Elasticsearch, SearchParts};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use esmcp_core::{
    Cluster, ClusterCredentials, ClusterLocator, EsMcpError, IndexDescriptor, IndexMappings,
    IndexStats, IndicesStatsResponse, MappingsResponse, Result, SearchResponse,
};

/// Columns requested from `_cat/indices`.
const CAT_COLUMNS: &[&str] = &["health", "status", "index", "docs.count", "store.size"];

/// Transport options beyond the credentials.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Per-request timeout.
    pub request_timeout: Option<Duration>,
}

/// Elasticsearch-backed cluster.
pub struct EsCluster {
    client: Elasticsearch,
}

impl EsCluster {
    /// Wrap an existing client.
    pub fn new(client: Elasticsearch) -> Self {
        Self { client }
    }

    /// Build a client from credentials. Does not contact the cluster.
    pub fn connect(credentials: &ClusterCredentials, options: &ConnectOptions) -> Result<Self> {
        let transport = match &credentials.locator {
            ClusterLocator::CloudId(cloud_id) => {
                let pool = CloudConnectionPool::new(cloud_id)
                    .map_err(|e| EsMcpError::config(format!("Invalid cloud id: {}", e)))?;
                build_transport(pool, &credentials.api_key, options)?
            }
            ClusterLocator::Url(url) => {
                let url = Url::parse(url)
                    .map_err(|e| EsMcpError::config(format!("Invalid cluster URL '{}': {}", url, e)))?;
                build_transport(SingleNodeConnectionPool::new(url), &credentials.api_key, options)?
            }
        };

        info!("Created Elasticsearch client for {:?}", credentials.locator);
        Ok(Self::new(Elasticsearch::new(transport)))
    }

    async fn fetch_mappings(&self, index: &str) -> Result<MappingsResponse> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await;
        read_json(response, Some(index)).await
    }
}

fn build_transport<P>(pool: P, api_key: &str, options: &ConnectOptions) -> Result<Transport>
where
    P: ConnectionPool + std::fmt::Debug + Clone + Send + 'static,
{
    let user_agent = HeaderValue::from_str(&format!("es-mcp/{}", env!("CARGO_PKG_VERSION")))
        .map_err(|e| EsMcpError::config(e.to_string()))?;

    let mut builder = TransportBuilder::new(pool)
        .auth(Credentials::EncodedApiKey(api_key.to_string()))
        .header(USER_AGENT, user_agent);
    if let Some(timeout) = options.request_timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| EsMcpError::connection(format!("Failed to build transport: {}", e)))
}

/// Map a transport failure to a cluster error.
fn transport_error(e: elasticsearch::Error) -> EsMcpError {
    error!("Elasticsearch request failed: {:?}", e);
    match e.status_code() {
        Some(status) => EsMcpError::cluster_status(status.as_u16(), e.to_string()),
        None => EsMcpError::cluster(e.to_string()),
    }
}

/// Turn a non-success response into an error, keeping the cluster's reason.
async fn check(
    result: std::result::Result<Response, elasticsearch::Error>,
    index: Option<&str>,
) -> Result<Response> {
    let response = result.map_err(transport_error)?;
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(response_error(status.as_u16(), &body, index))
}

fn response_error(status: u16, body: &str, index: Option<&str>) -> EsMcpError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let error_type = error
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str);

    if error_type == Some("index_not_found_exception") {
        let name = error
            .and_then(|e| e.get("index"))
            .and_then(Value::as_str)
            .or(index)
            .unwrap_or_default();
        return EsMcpError::index_not_found(name);
    }

    let reason = match (error_type, error.and_then(|e| e.get("reason")).and_then(Value::as_str)) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (None, Some(reason)) => reason.to_string(),
        _ if body.is_empty() => "no response body".to_string(),
        _ => body.to_string(),
    };
    EsMcpError::cluster_status(status, reason)
}

async fn read_json<T: DeserializeOwned>(
    result: std::result::Result<Response, elasticsearch::Error>,
    index: Option<&str>,
) -> Result<T> {
    let response = check(result, index).await?;
    response.json::<T>().await.map_err(transport_error)
}

/// Pick the entry for `index` from a response keyed by index name. An alias
/// resolves to a different key, which is accepted only when it is the sole
/// entry.
fn entry_for<T>(mut by_index: HashMap<String, T>, index: &str) -> Result<T> {
    if let Some(entry) = by_index.remove(index) {
        return Ok(entry);
    }
    if by_index.len() > 1 {
        let mut names: Vec<String> = by_index.into_keys().collect();
        names.sort();
        return Err(EsMcpError::invalid_query(format!(
            "'{}' resolves to {} indices ({}); name a single index",
            index,
            names.len(),
            names.join(", ")
        )));
    }
    by_index
        .into_values()
        .next()
        .ok_or_else(|| EsMcpError::index_not_found(index))
}

/// Union of the top-level `properties` of every entry. On a field defined
/// differently across indices, the index that sorts first wins.
fn merge_mappings(by_index: MappingsResponse, index: &str) -> Result<Value> {
    if by_index.len() <= 1 {
        return Ok(entry_for(by_index, index)?.mappings);
    }

    let mut entries: Vec<(String, IndexMappings)> = by_index.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut properties = Map::new();
    for (_, entry) in &entries {
        if let Some(fields) = entry.mappings.get("properties").and_then(Value::as_object) {
            for (field, definition) in fields {
                properties
                    .entry(field.clone())
                    .or_insert_with(|| definition.clone());
            }
        }
    }
    debug!(
        "Merged {} fields across {} indices for {}",
        properties.len(),
        entries.len(),
        index
    );
    Ok(json!({ "properties": properties }))
}

#[async_trait]
impl Cluster for EsCluster {
    async fn ping(&self) -> Result<bool> {
        let response = self.client.ping().send().await.map_err(transport_error)?;
        Ok(response.status_code().is_success())
    }

    async fn list_indices(&self) -> Result<Vec<IndexDescriptor>> {
        let response = self
            .client
            .cat()
            .indices(CatIndicesParts::None)
            .format("json")
            .h(CAT_COLUMNS)
            .send()
            .await;
        let indices: Vec<IndexDescriptor> = read_json(response, None).await?;
        debug!("Catalog returned {} indices", indices.len());
        Ok(indices)
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(EsMcpError::cluster_status(
                status,
                format!("Unexpected status checking index '{}'", index),
            )),
        }
    }

    async fn get_mapping(&self, index: &str) -> Result<Value> {
        let by_index = self.fetch_mappings(index).await?;
        Ok(entry_for(by_index, index)?.mappings)
    }

    async fn field_mappings(&self, index: &str) -> Result<Value> {
        let by_index = self.fetch_mappings(index).await?;
        merge_mappings(by_index, index)
    }

    async fn get_settings(&self, index: &str) -> Result<Value> {
        let response = self
            .client
            .indices()
            .get(IndicesGetParts::Index(&[index]))
            .send()
            .await;
        let by_index: HashMap<String, Value> = read_json(response, Some(index)).await?;
        let mut info = entry_for(by_index, index)?;
        Ok(info
            .get_mut("settings")
            .map(Value::take)
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        let response = self
            .client
            .indices()
            .stats(IndicesStatsParts::Index(&[index]))
            .send()
            .await;
        let stats: IndicesStatsResponse = read_json(response, Some(index)).await?;
        Ok(stats.into())
    }

    async fn search(&self, index: &str, body: Map<String, Value>) -> Result<SearchResponse> {
        let body = Value::Object(body);
        debug!("Searching {} with body {}", index, body);
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await;
        read_json(response, Some(index)).await
    }

    fn close(&self) {
        // The client has no close call. Its pooled connections are freed
        // when the last handle drops, i.e. when the owning `Lifespan` goes.
        debug!("Elasticsearch transport released on drop");
    }
}
