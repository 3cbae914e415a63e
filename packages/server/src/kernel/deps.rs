//! Director dependencies (using traits for testability)
//!
//! The director only talks to the outside world through [`DirectorDeps`].
//! Production wiring uses the gRPC backend client and one of the Agones
//! allocation clients; tests swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use agones_client::{
    AgonesError, Allocation, AllocatorServiceClient, AllocatorServiceOptions,
    ClusterAllocationClient,
};
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{AllocatorConfig, AllocatorMode};
use crate::kernel::{BaseBackendService, BaseGameServerAllocator, GrpcBackendClient};

// =============================================================================
// Allocator adapters
// =============================================================================

#[async_trait]
impl BaseGameServerAllocator for ClusterAllocationClient {
    fn fleet(&self) -> &str {
        ClusterAllocationClient::fleet(self)
    }

    async fn allocate(&self) -> Result<Allocation, AgonesError> {
        ClusterAllocationClient::allocate(self).await
    }
}

#[async_trait]
impl BaseGameServerAllocator for AllocatorServiceClient {
    fn fleet(&self) -> &str {
        AllocatorServiceClient::fleet(self)
    }

    async fn allocate(&self) -> Result<Allocation, AgonesError> {
        AllocatorServiceClient::allocate(self).await
    }
}

/// Build the allocation client selected by `AGONES_ALLOCATOR_MODE`.
pub fn create_allocator(config: &AllocatorConfig) -> Result<Arc<dyn BaseGameServerAllocator>> {
    match config.mode {
        AllocatorMode::Cluster => {
            let client = match &config.api_server {
                Some(api_server) => ClusterAllocationClient::from_api_server(
                    api_server,
                    config.api_token.clone(),
                    config.api_ca.as_deref(),
                    &config.namespace,
                    &config.fleet,
                )
                .context("Failed to configure Agones allocation for AGONES_API_SERVER")?,
                None => ClusterAllocationClient::in_cluster(&config.namespace, &config.fleet)
                    .context(
                        "Failed to configure in-cluster Agones allocation \
                         (set AGONES_API_SERVER when running outside a cluster)",
                    )?,
            };
            tracing::info!(
                namespace = %config.namespace,
                fleet = %config.fleet,
                "Using GameServerAllocation API"
            );
            Ok(Arc::new(client))
        }
        AllocatorMode::Http => {
            let endpoint = config
                .endpoint
                .clone()
                .context("AGONES_ALLOCATOR_ENDPOINT is required for the allocator service")?;
            let client = AllocatorServiceClient::new(AllocatorServiceOptions {
                endpoint,
                port: config.port,
                namespace: config.namespace.clone(),
                fleet: config.fleet.clone(),
                tls: config.tls.clone(),
            })
            .context("Failed to configure Agones allocator service client")?;
            tracing::info!(
                url = %client.url(),
                mutual_tls = client.uses_mutual_tls(),
                "Using Agones allocator service"
            );
            Ok(Arc::new(client))
        }
    }
}

// =============================================================================
// DirectorDeps
// =============================================================================

#[derive(Clone)]
pub struct DirectorDeps {
    pub backend: Arc<dyn BaseBackendService>,
    pub allocator: Arc<dyn BaseGameServerAllocator>,
}

impl DirectorDeps {
    pub fn new(
        backend: Arc<dyn BaseBackendService>,
        allocator: Arc<dyn BaseGameServerAllocator>,
    ) -> Self {
        Self { backend, allocator }
    }

    /// Production wiring from configuration.
    pub fn from_config(backend_addr: &str, allocator: &AllocatorConfig) -> Result<Self> {
        Ok(Self {
            backend: Arc::new(GrpcBackendClient::new(backend_addr)),
            allocator: create_allocator(allocator)?,
        })
    }
}
