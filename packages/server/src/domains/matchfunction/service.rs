//! `MatchFunction` gRPC service.

use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::{stream, FutureExt, StreamExt};
use open_match_api::{
    Match, MatchFunction, MatchFunctionServer, MatchProfile, Pool, RunRequest, RunResponse, Ticket,
};
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use super::{dedupe_tickets, make_matches};
use crate::common::panic_message;
use crate::kernel::{log_status, BaseQueryService, DeadlineStream, GrpcStream};

const MAX_CONCURRENT_CALLS: usize = 10;

pub struct MatchFunctionService {
    query: Arc<dyn BaseQueryService>,
    query_timeout: Duration,
}

impl MatchFunctionService {
    pub fn new(query: Arc<dyn BaseQueryService>, query_timeout: Duration) -> Self {
        Self {
            query,
            query_timeout,
        }
    }

    /// All tickets currently in `pool`. A failing query contributes nothing.
    async fn query_pool(&self, pool: Pool) -> Vec<Ticket> {
        let name = pool.name.clone();
        let stream = match self.query.query_tickets(pool, self.query_timeout).await {
            Ok(stream) => stream,
            Err(status) => {
                log_status("QueryTickets", &status);
                return Vec::new();
            }
        };

        let pages = DeadlineStream::with_timeout(stream, self.query_timeout, "QueryTickets")
            .collect()
            .await;
        let tickets: Vec<Ticket> = pages.into_iter().flat_map(|page| page.tickets).collect();

        tracing::debug!(pool = %name, tickets = tickets.len(), "Queried pool");
        tickets
    }

    /// Proposals for one profile.
    pub async fn propose(&self, profile: &MatchProfile) -> Vec<Match> {
        let mut tickets = Vec::new();
        for pool in &profile.pools {
            tickets.extend(self.query_pool(pool.clone()).await);
        }

        let tickets = dedupe_tickets(tickets);
        let matches = make_matches(&profile.name, &tickets);

        tracing::info!(
            profile = %profile.name,
            tickets = tickets.len(),
            proposals = matches.len(),
            "Generated match proposals"
        );
        matches
    }
}

#[tonic::async_trait]
impl MatchFunction for MatchFunctionService {
    type RunStream = GrpcStream<RunResponse>;

    async fn run(&self, request: Request<RunRequest>) -> Result<Response<Self::RunStream>, Status> {
        let profile = request
            .into_inner()
            .profile
            .ok_or_else(|| Status::invalid_argument("profile is required"))?;

        let responses: Vec<Result<RunResponse, Status>> =
            match AssertUnwindSafe(self.propose(&profile)).catch_unwind().await {
                Ok(proposals) if proposals.is_empty() => vec![Ok(RunResponse::default())],
                Ok(proposals) => proposals
                    .into_iter()
                    .map(|m| Ok(RunResponse { proposal: Some(m) }))
                    .collect(),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(profile = %profile.name, error = %message, "Match function failed");
                    vec![
                        Ok(RunResponse::default()),
                        Err(Status::internal(format!("match function failed: {}", message))),
                    ]
                }
            };

        Ok(Response::new(stream::iter(responses).boxed()))
    }
}

/// Serve the match function until `shutdown` resolves.
pub async fn serve<F>(service: MatchFunctionService, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tracing::info!("Match function listening on {}", addr);

    Server::builder()
        .concurrency_limit_per_connection(MAX_CONCURRENT_CALLS)
        .add_service(MatchFunctionServer::new(service))
        .serve_with_shutdown(addr, shutdown)
        .await
        .context("Match function server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::matchfunction::MATCH_FUNCTION_NAME;
    use crate::kernel::MockQueryService;
    use tonic::Code;

    fn profile(pools: &[&str]) -> MatchProfile {
        MatchProfile {
            name: "simple-2player-profile".to_string(),
            pools: pools
                .iter()
                .map(|p| Pool {
                    name: p.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    async fn run_profile(
        service: &MatchFunctionService,
        profile: Option<MatchProfile>,
    ) -> Result<Vec<RunResponse>, Status> {
        let response = service.run(Request::new(RunRequest { profile })).await?;
        let items: Vec<_> = response.into_inner().collect().await;
        items.into_iter().collect()
    }

    #[tokio::test]
    async fn test_pairs_tickets_across_pools() {
        let query = Arc::new(
            MockQueryService::new()
                .with_page("everyone", &["a", "b"])
                .with_page("everyone", &["c"])
                .with_page("eu-west", &["c", "d"]),
        );
        let service = MatchFunctionService::new(query.clone(), Duration::from_secs(10));

        let responses = run_profile(&service, Some(profile(&["everyone", "eu-west"])))
            .await
            .unwrap();

        assert_eq!(responses.len(), 2);
        let first = responses[0].proposal.as_ref().unwrap();
        let second = responses[1].proposal.as_ref().unwrap();
        assert_eq!(first.ticket_ids(), vec!["a", "b"]);
        assert_eq!(second.ticket_ids(), vec!["c", "d"]);
        assert_eq!(first.match_function, MATCH_FUNCTION_NAME);
        assert_eq!(query.calls(), vec!["everyone", "eu-west"]);
    }

    #[tokio::test]
    async fn test_no_proposals_streams_one_empty_response() {
        let query = Arc::new(MockQueryService::new().with_page("everyone", &["a"]));
        let service = MatchFunctionService::new(query, Duration::from_secs(10));

        let responses = run_profile(&service, Some(profile(&["everyone"]))).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].proposal.is_none());
    }

    #[tokio::test]
    async fn test_failing_query_contributes_nothing() {
        let query = Arc::new(MockQueryService::new().with_error(Code::Unavailable, "query down"));
        let service = MatchFunctionService::new(query, Duration::from_secs(10));

        let responses = run_profile(&service, Some(profile(&["everyone"]))).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].proposal.is_none());
    }

    #[tokio::test]
    async fn test_internal_failure_sends_empty_response_then_internal() {
        let query = Arc::new(MockQueryService::new().with_panic());
        let service = MatchFunctionService::new(query, Duration::from_secs(10));

        let response = service
            .run(Request::new(RunRequest {
                profile: Some(profile(&["everyone"])),
            }))
            .await
            .unwrap();
        let items: Vec<Result<RunResponse, Status>> = response.into_inner().collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &RunResponse { proposal: None });
        assert_eq!(items[1].as_ref().unwrap_err().code(), Code::Internal);
    }

    #[tokio::test]
    async fn test_missing_profile_is_invalid_argument() {
        let service =
            MatchFunctionService::new(Arc::new(MockQueryService::new()), Duration::from_secs(10));

        let err = run_profile(&service, None).await.unwrap_err();
        assert_eq!(err.code(), Code::InvalidArgument);
    }
}
