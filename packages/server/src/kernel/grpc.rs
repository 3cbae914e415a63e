//! gRPC implementations of the Open Match service traits.
//!
//! Every call opens its own channel and drops it when the call finishes,
//! success or not. Unary calls are bounded client-side by their timeout as
//! well as carrying it as the gRPC deadline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use open_match_api::{
    AssignTicketsRequest, AssignTicketsResponse, BackendServiceClient, CreateTicketRequest,
    DeleteTicketRequest, FetchMatchesRequest, FetchMatchesResponse, FrontendServiceClient,
    GetTicketRequest, Pool, QueryServiceClient, QueryTicketsRequest, QueryTicketsResponse, Ticket,
    WatchAssignmentsRequest, WatchAssignmentsResponse,
};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

use super::traits::{BaseBackendService, BaseFrontendService, BaseQueryService, GrpcStream};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Log a gRPC failure the way every call site does.
pub fn log_status(operation: &str, status: &Status) {
    match status.code() {
        Code::Unavailable => {
            tracing::warn!(operation, message = status.message(), "Service unavailable")
        }
        Code::DeadlineExceeded => {
            tracing::warn!(operation, message = status.message(), "Deadline exceeded")
        }
        code => tracing::error!(
            operation,
            code = ?code,
            message = status.message(),
            "gRPC error"
        ),
    }
}

fn endpoint_uri(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

async fn connect(addr: &str) -> Result<Channel, Status> {
    Endpoint::from_shared(endpoint_uri(addr))
        .map_err(|e| Status::invalid_argument(format!("invalid address {}: {}", addr, e)))?
        .connect_timeout(CONNECT_TIMEOUT)
        .connect()
        .await
        .map_err(|e| Status::unavailable(format!("failed to connect to {}: {}", addr, e)))
}

fn timed<T>(message: T, timeout: Duration) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    request
}

async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, Status>>,
) -> Result<T, Status> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| Status::deadline_exceeded("client deadline exceeded"))?
}

// =============================================================================
// Backend
// =============================================================================

pub struct GrpcBackendClient {
    addr: String,
}

impl GrpcBackendClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    async fn client(&self) -> Result<BackendServiceClient<Channel>, Status> {
        Ok(BackendServiceClient::new(connect(&self.addr).await?))
    }
}

#[async_trait]
impl BaseBackendService for GrpcBackendClient {
    async fn fetch_matches(
        &self,
        request: FetchMatchesRequest,
        timeout: Duration,
    ) -> Result<GrpcStream<FetchMatchesResponse>, Status> {
        let mut client = self.client().await?;
        let response = client.fetch_matches(timed(request, timeout)).await?;
        Ok(response.into_inner().boxed())
    }

    async fn assign_tickets(
        &self,
        request: AssignTicketsRequest,
        timeout: Duration,
    ) -> Result<AssignTicketsResponse, Status> {
        let mut client = self.client().await?;
        bounded(timeout, client.assign_tickets(timed(request, timeout)))
            .await
            .map(|response| response.into_inner())
    }
}

// =============================================================================
// Frontend
// =============================================================================

pub struct GrpcFrontendClient {
    addr: String,
}

impl GrpcFrontendClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    async fn client(&self) -> Result<FrontendServiceClient<Channel>, Status> {
        Ok(FrontendServiceClient::new(connect(&self.addr).await?))
    }
}

#[async_trait]
impl BaseFrontendService for GrpcFrontendClient {
    async fn create_ticket(&self, ticket: Ticket, timeout: Duration) -> Result<Ticket, Status> {
        let mut client = self.client().await?;
        let request = CreateTicketRequest {
            ticket: Some(ticket),
        };
        bounded(timeout, client.create_ticket(timed(request, timeout)))
            .await
            .map(|response| response.into_inner())
    }

    async fn get_ticket(&self, ticket_id: &str, timeout: Duration) -> Result<Ticket, Status> {
        let mut client = self.client().await?;
        let request = GetTicketRequest {
            ticket_id: ticket_id.to_string(),
        };
        bounded(timeout, client.get_ticket(timed(request, timeout)))
            .await
            .map(|response| response.into_inner())
    }

    async fn delete_ticket(&self, ticket_id: &str, timeout: Duration) -> Result<(), Status> {
        let mut client = self.client().await?;
        let request = DeleteTicketRequest {
            ticket_id: ticket_id.to_string(),
        };
        bounded(timeout, client.delete_ticket(timed(request, timeout)))
            .await
            .map(|_| ())
    }

    async fn watch_assignments(
        &self,
        ticket_id: &str,
        timeout: Duration,
    ) -> Result<GrpcStream<WatchAssignmentsResponse>, Status> {
        let mut client = self.client().await?;
        let request = WatchAssignmentsRequest {
            ticket_id: ticket_id.to_string(),
        };
        let response = client.watch_assignments(timed(request, timeout)).await?;
        Ok(response.into_inner().boxed())
    }
}

// =============================================================================
// Query
// =============================================================================

pub struct GrpcQueryClient {
    addr: String,
}

impl GrpcQueryClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl BaseQueryService for GrpcQueryClient {
    async fn query_tickets(
        &self,
        pool: Pool,
        timeout: Duration,
    ) -> Result<GrpcStream<QueryTicketsResponse>, Status> {
        let mut client = QueryServiceClient::new(connect(&self.addr).await?);
        let request = QueryTicketsRequest { pool: Some(pool) };
        let response = client.query_tickets(timed(request, timeout)).await?;
        Ok(response.into_inner().boxed())
    }
}
