//! Connection lifecycle: connect, verify, release once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use esmcp_core::{Cluster, ClusterCredentials, EsMcpError, Result};

use crate::elastic::{ConnectOptions, EsCluster};

/// Shared, read-only handle to the cluster.
pub type ClusterHandle = Arc<dyn Cluster>;

/// Owns the cluster handle for the lifetime of the server.
///
/// The handle is released exactly once, by [`Lifespan::close`] on a normal
/// shutdown or by `Drop` on any other exit path.
pub struct Lifespan {
    cluster: ClusterHandle,
    closed: AtomicBool,
}

impl Lifespan {
    /// Connect to Elasticsearch with the given credentials and verify the
    /// cluster answers.
    pub async fn connect(credentials: &ClusterCredentials, options: &ConnectOptions) -> Result<Self> {
        let cluster = EsCluster::connect(credentials, options)?;
        Self::start(Arc::new(cluster)).await
    }

    /// Take ownership of an already built cluster and verify it answers.
    ///
    /// On failure the cluster is released before the error is returned.
    pub async fn start(cluster: ClusterHandle) -> Result<Self> {
        let lifespan = Self {
            cluster,
            closed: AtomicBool::new(false),
        };

        match lifespan.cluster.ping().await {
            Ok(true) => {
                info!("Connected to Elasticsearch");
                Ok(lifespan)
            }
            Ok(false) => Err(EsMcpError::connection(
                "Elasticsearch cluster is not reachable",
            )),
            Err(e) => Err(EsMcpError::connection(format!(
                "Elasticsearch cluster is not reachable: {}",
                e
            ))),
        }
    }

    /// A clone of the shared handle.
    pub fn handle(&self) -> ClusterHandle {
        Arc::clone(&self.cluster)
    }

    /// Release the handle on normal shutdown.
    pub fn close(self) {
        self.release();
    }

    fn release(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if Arc::strong_count(&self.cluster) > 1 {
            debug!("Closing Elasticsearch client while handles are still held");
        }
        self.cluster.close();
        info!("Elasticsearch client closed");
    }
}

impl Drop for Lifespan {
    fn drop(&mut self) {
        self.release();
    }
}
