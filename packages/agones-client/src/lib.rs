//! Agones game server allocation client.
//!
//! Two ways to reserve one game server out of a fleet:
//!
//! - [`ClusterAllocationClient`] creates a `GameServerAllocation` object through
//!   the Kubernetes API (for directors running inside the cluster).
//! - [`AllocatorServiceClient`] POSTs to the Agones allocator service over
//!   HTTPS, with mutual TLS when client credentials are available.
//!
//! Both return the same [`Allocation`] and apply the same validation rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use agones_client::ClusterAllocationClient;
//!
//! let client = ClusterAllocationClient::in_cluster("game", "ue5-gameserver-fleet")?;
//! let allocation = client.allocate().await?;
//! println!("{}", allocation.connection());
//! ```

pub mod allocator_service;
pub mod cluster;
pub mod error;
pub mod types;

pub use allocator_service::{AllocatorServiceClient, AllocatorServiceOptions, TlsFiles};
pub use cluster::{ClusterAllocationClient, ClusterOptions};
pub use error::{AgonesError, Result};
pub use types::{
    select_game_port, Allocation, AllocationStatus, GameServerAllocation,
    GameServerAllocationResult, GameServerPort,
};

use std::time::Duration;

/// Upper bound for a single allocation round trip.
pub const ALLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Send a prepared allocation request and validate the answer.
///
/// Only 200 and 201 count as success; anything else becomes [`AgonesError::Api`].
pub(crate) async fn send_allocation(request: reqwest::RequestBuilder) -> Result<Allocation> {
    let resp = request.send().await?;

    let status = resp.status();
    if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
        let body = resp.text().await.unwrap_or_default();
        return Err(AgonesError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let result: GameServerAllocationResult = resp.json().await?;
    tracing::debug!(
        state = %result.status.state,
        address = %result.status.address,
        ports = result.status.ports.len(),
        "Allocation response received"
    );

    result.status.into_allocation()
}
