// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - each wraps one external service.
// Matchmaking logic (fetch, allocate, assign, pairing) lives in the domains and
// takes these as `&dyn` / `Arc<dyn>` so tests can swap in the mocks from
// `test_dependencies`.
//
// Naming convention: Base* for trait names (e.g., BaseBackendService)

use std::time::Duration;

use agones_client::{AgonesError, Allocation};
use async_trait::async_trait;
use futures::stream::BoxStream;
use open_match_api::{
    AssignTicketsRequest, AssignTicketsResponse, FetchMatchesRequest, FetchMatchesResponse, Pool,
    QueryTicketsResponse, Ticket, WatchAssignmentsResponse,
};
use tonic::Status;

/// Server-streaming response as seen by callers.
pub type GrpcStream<T> = BoxStream<'static, Result<T, Status>>;

// =============================================================================
// Open Match Backend
// =============================================================================

#[async_trait]
pub trait BaseBackendService: Send + Sync {
    /// Open the FetchMatches stream. `timeout` is propagated as the call deadline.
    async fn fetch_matches(
        &self,
        request: FetchMatchesRequest,
        timeout: Duration,
    ) -> Result<GrpcStream<FetchMatchesResponse>, Status>;

    async fn assign_tickets(
        &self,
        request: AssignTicketsRequest,
        timeout: Duration,
    ) -> Result<AssignTicketsResponse, Status>;
}

// =============================================================================
// Open Match Frontend (ticket lifecycle)
// =============================================================================

#[async_trait]
pub trait BaseFrontendService: Send + Sync {
    /// Returns the ticket with its backend-assigned id.
    async fn create_ticket(&self, ticket: Ticket, timeout: Duration) -> Result<Ticket, Status>;

    async fn get_ticket(&self, ticket_id: &str, timeout: Duration) -> Result<Ticket, Status>;

    async fn delete_ticket(&self, ticket_id: &str, timeout: Duration) -> Result<(), Status>;

    async fn watch_assignments(
        &self,
        ticket_id: &str,
        timeout: Duration,
    ) -> Result<GrpcStream<WatchAssignmentsResponse>, Status>;
}

// =============================================================================
// Open Match Query Service
// =============================================================================

#[async_trait]
pub trait BaseQueryService: Send + Sync {
    async fn query_tickets(
        &self,
        pool: Pool,
        timeout: Duration,
    ) -> Result<GrpcStream<QueryTicketsResponse>, Status>;
}

// =============================================================================
// Game Server Allocator
// =============================================================================

/// Reserve one game server; address+port or a typed failure.
#[async_trait]
pub trait BaseGameServerAllocator: Send + Sync {
    fn fleet(&self) -> &str;

    async fn allocate(&self) -> Result<Allocation, AgonesError>;
}
