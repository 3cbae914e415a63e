//! Test harness: fake Open Match services on ephemeral ports.
//!
//! Each fake is a real tonic server bound to 127.0.0.1:0, so the production
//! gRPC clients are exercised end to end.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::BoxStream;
use futures::{stream, StreamExt};
use open_match_api::{
    AssignTicketsRequest, AssignTicketsResponse, BackendService, BackendServiceServer,
    FetchMatchesRequest, FetchMatchesResponse, Match, QueryService, QueryServiceServer,
    QueryTicketsRequest, QueryTicketsResponse, Ticket,
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Router;
use tonic::{Request, Response, Status};

/// Install a test subscriber once; respects RUST_LOG.
///
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serve `router` on an ephemeral local port.
pub async fn spawn_grpc(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        router
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("test gRPC server");
    });

    addr
}

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub matches: Vec<Match>,
    /// Keep FetchMatches open after the matches were sent.
    pub hang: bool,
    /// Delay before each streamed match.
    pub delay: Option<Duration>,
    pub fetched: Arc<Mutex<Vec<FetchMatchesRequest>>>,
    pub assigned: Arc<Mutex<Vec<AssignTicketsRequest>>>,
}

impl FakeBackend {
    pub fn with_matches(matches: Vec<Match>) -> Self {
        Self {
            matches,
            ..Default::default()
        }
    }

    pub async fn spawn(&self) -> SocketAddr {
        spawn_grpc(
            tonic::transport::Server::builder().add_service(BackendServiceServer::new(self.clone())),
        )
        .await
    }

    pub fn assigned(&self) -> Vec<AssignTicketsRequest> {
        self.assigned.lock().unwrap().clone()
    }
}

#[tonic::async_trait]
impl BackendService for FakeBackend {
    type FetchMatchesStream = BoxStream<'static, Result<FetchMatchesResponse, Status>>;

    async fn fetch_matches(
        &self,
        request: Request<FetchMatchesRequest>,
    ) -> Result<Response<Self::FetchMatchesStream>, Status> {
        self.fetched.lock().unwrap().push(request.into_inner());

        let delay = self.delay;
        let responses = stream::iter(self.matches.clone()).then(move |m| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, Status>(FetchMatchesResponse { r#match: Some(m) })
        });

        // One keep-alive style empty response first
        let keep_alive = stream::once(async { Ok::<_, Status>(FetchMatchesResponse::default()) });
        let mut out = keep_alive.chain(responses).boxed();
        if self.hang {
            out = out.chain(stream::pending()).boxed();
        }

        Ok(Response::new(out))
    }

    async fn assign_tickets(
        &self,
        request: Request<AssignTicketsRequest>,
    ) -> Result<Response<AssignTicketsResponse>, Status> {
        self.assigned.lock().unwrap().push(request.into_inner());
        Ok(Response::new(AssignTicketsResponse::default()))
    }
}

// =============================================================================
// Fake Query Service
// =============================================================================

#[derive(Clone, Default)]
pub struct FakeQuery {
    pub pools: HashMap<String, Vec<Ticket>>,
}

impl FakeQuery {
    pub fn with_pool(mut self, name: &str, tickets: Vec<Ticket>) -> Self {
        self.pools.insert(name.to_string(), tickets);
        self
    }

    pub async fn spawn(&self) -> SocketAddr {
        spawn_grpc(
            tonic::transport::Server::builder().add_service(QueryServiceServer::new(self.clone())),
        )
        .await
    }
}

#[tonic::async_trait]
impl QueryService for FakeQuery {
    type QueryTicketsStream = BoxStream<'static, Result<QueryTicketsResponse, Status>>;

    async fn query_tickets(
        &self,
        request: Request<QueryTicketsRequest>,
    ) -> Result<Response<Self::QueryTicketsStream>, Status> {
        let pool = request
            .into_inner()
            .pool
            .ok_or_else(|| Status::invalid_argument("pool is required"))?;
        let tickets = self.pools.get(&pool.name).cloned().unwrap_or_default();

        Ok(Response::new(
            stream::once(async move { Ok(QueryTicketsResponse { tickets }) }).boxed(),
        ))
    }
}
