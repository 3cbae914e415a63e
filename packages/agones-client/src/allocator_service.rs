//! Allocation through the Agones allocator service (HTTPS, optional mTLS).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AgonesError, Result};
use crate::types::{Allocation, GameServerAllocation};
use crate::{send_allocation, ALLOCATION_TIMEOUT};

/// Client certificate, key and CA for mutual TLS.
#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca: PathBuf,
}

impl TlsFiles {
    pub fn all_present(&self) -> bool {
        self.cert.is_file() && self.key.is_file() && self.ca.is_file()
    }
}

#[derive(Debug, Clone)]
pub struct AllocatorServiceOptions {
    pub endpoint: String,
    pub port: u16,
    pub namespace: String,
    pub fleet: String,
    pub tls: Option<TlsFiles>,
}

pub struct AllocatorServiceClient {
    client: reqwest::Client,
    url: String,
    namespace: String,
    fleet: String,
    mutual_tls: bool,
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| AgonesError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl AllocatorServiceClient {
    /// Build the HTTP client.
    ///
    /// Mutual TLS is used only when all three credential files exist right now;
    /// otherwise the client skips certificate validation, which is only
    /// acceptable in development.
    pub fn new(options: AllocatorServiceOptions) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(ALLOCATION_TIMEOUT);

        let (builder, mutual_tls) = match options.tls.as_ref().filter(|t| t.all_present()) {
            Some(files) => {
                let mut identity_pem = read_file(&files.cert)?;
                identity_pem.push(b'\n');
                identity_pem.extend(read_file(&files.key)?);

                let identity = reqwest::Identity::from_pem(&identity_pem)?;
                let ca = reqwest::Certificate::from_pem(&read_file(&files.ca)?)?;

                tracing::info!("Using mutual TLS for the allocator service");
                (builder.identity(identity).add_root_certificate(ca), true)
            }
            None => {
                tracing::warn!(
                    "TLS client credentials not found, calling the allocator service \
                     without client auth and without certificate validation (development only)"
                );
                (builder.danger_accept_invalid_certs(true), false)
            }
        };

        Ok(Self {
            client: builder.build()?,
            url: format!(
                "https://{}:{}/gameserverallocation",
                options.endpoint, options.port
            ),
            namespace: options.namespace,
            fleet: options.fleet,
            mutual_tls,
        })
    }

    /// Point the client at a different allocation URL (e.g. a local proxy).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn uses_mutual_tls(&self) -> bool {
        self.mutual_tls
    }

    pub fn fleet(&self) -> &str {
        &self.fleet
    }

    /// Reserve one game server from the fleet.
    pub async fn allocate(&self) -> Result<Allocation> {
        let body = GameServerAllocation::for_fleet(&self.namespace, &self.fleet);
        send_allocation(self.client.post(&self.url).json(&body)).await
    }
}
