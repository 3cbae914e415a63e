//! Control-plane allocation through the Kubernetes API.

use std::env;
use std::fs;
use std::path::Path;

use crate::error::{AgonesError, Result};
use crate::types::{Allocation, GameServerAllocation};
use crate::{send_allocation, ALLOCATION_TIMEOUT};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Base URL of the API server, e.g. `https://10.96.0.1:443`.
    pub api_server: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// PEM bundle trusted for the API server certificate.
    pub ca_pem: Option<Vec<u8>>,
    pub namespace: String,
    pub fleet: String,
}

/// Creates `GameServerAllocation` objects in the fleet's namespace.
pub struct ClusterAllocationClient {
    client: reqwest::Client,
    options: ClusterOptions,
}

impl ClusterAllocationClient {
    pub fn new(options: ClusterOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(ALLOCATION_TIMEOUT);
        if let Some(ca) = &options.ca_pem {
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(ca)?);
        }

        Ok(Self {
            client: builder.build()?,
            options,
        })
    }

    /// Build a client for an explicitly configured API server, e.g. a remote
    /// cluster from a developer machine or `kubectl proxy` on localhost.
    pub fn from_api_server(
        api_server: &str,
        token: Option<String>,
        ca_path: Option<&Path>,
        namespace: &str,
        fleet: &str,
    ) -> Result<Self> {
        let ca_pem = match ca_path {
            Some(path) => Some(fs::read(path).map_err(|source| AgonesError::Io {
                path: path.display().to_string(),
                source,
            })?),
            None => None,
        };

        tracing::info!(api_server = %api_server, "Using configured Kubernetes API server");

        Self::new(ClusterOptions {
            api_server: api_server.to_string(),
            token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            ca_pem,
            namespace: namespace.to_string(),
            fleet: fleet.to_string(),
        })
    }

    /// Build a client from the pod's service account.
    pub fn in_cluster(namespace: &str, fleet: &str) -> Result<Self> {
        let host = env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            AgonesError::Config("KUBERNETES_SERVICE_HOST is not set (not running in a cluster)".into())
        })?;
        let port = env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        let token_path = format!("{}/token", SERVICE_ACCOUNT_DIR);
        let ca_path = format!("{}/ca.crt", SERVICE_ACCOUNT_DIR);
        let token = fs::read_to_string(&token_path).map_err(|source| AgonesError::Io {
            path: token_path,
            source,
        })?;
        let ca_pem = fs::read(&ca_path).map_err(|source| AgonesError::Io {
            path: ca_path,
            source,
        })?;

        let api_server = if host.contains(':') {
            format!("https://[{}]:{}", host, port)
        } else {
            format!("https://{}:{}", host, port)
        };

        tracing::info!(api_server = %api_server, "Loaded in-cluster Kubernetes config");

        Self::new(ClusterOptions {
            api_server,
            token: Some(token.trim().to_string()),
            ca_pem: Some(ca_pem),
            namespace: namespace.to_string(),
            fleet: fleet.to_string(),
        })
    }

    pub fn allocations_url(&self) -> String {
        format!(
            "{}/apis/allocation.agones.dev/v1/namespaces/{}/gameserverallocations",
            self.options.api_server.trim_end_matches('/'),
            self.options.namespace
        )
    }

    pub fn fleet(&self) -> &str {
        &self.options.fleet
    }

    /// Reserve one game server from the fleet.
    pub async fn allocate(&self) -> Result<Allocation> {
        let body = GameServerAllocation::for_fleet(&self.options.namespace, &self.options.fleet);

        let mut request = self.client.post(self.allocations_url()).json(&body);
        if let Some(token) = &self.options.token {
            request = request.bearer_auth(token);
        }

        send_allocation(request).await
    }
}
