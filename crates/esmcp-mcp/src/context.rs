//! Execution contexts passed to every operation.

use std::collections::HashMap;

use esmcp_cluster::ClusterHandle;

/// Application state shared by all operations: the cluster handle and
/// server-wide defaults.
#[derive(Clone)]
pub struct AppContext {
    cluster: ClusterHandle,
    default_page_size: usize,
}

impl AppContext {
    pub fn new(cluster: ClusterHandle, default_page_size: usize) -> Self {
        Self {
            cluster,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }
}

/// Parameters supplied by the transport for one invocation, e.g. the query
/// string of a resource URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    params: HashMap<String, String>,
}

impl InvocationContext {
    /// Build from key/value pairs. The first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = HashMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
