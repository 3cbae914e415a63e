use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use open_match_api::{EvaluateRequest, EvaluateResponse, Evaluator, EvaluatorServer};
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

use crate::kernel::GrpcStream;

const MAX_CONCURRENT_CALLS: usize = 10;

/// Echo each incoming match back as approved.
///
/// Requests without a match are skipped. An inbound error is logged and
/// surfaced as `INTERNAL`.
pub fn pass_through<S>(inbound: S) -> impl Stream<Item = Result<EvaluateResponse, Status>>
where
    S: Stream<Item = Result<EvaluateRequest, Status>>,
{
    inbound.filter_map(|item| async move {
        match item {
            Ok(request) => {
                let m = request.r#match?;
                tracing::debug!(match_id = %m.match_id, "Approving match");
                Some(Ok(EvaluateResponse {
                    match_id: m.match_id.clone(),
                    r#match: Some(m),
                }))
            }
            Err(status) => {
                tracing::error!(
                    code = ?status.code(),
                    message = status.message(),
                    "Evaluate stream failed"
                );
                Some(Err(Status::internal(format!(
                    "evaluation failed: {}",
                    status.message()
                ))))
            }
        }
    })
}

#[derive(Debug, Default)]
pub struct EvaluatorService;

#[tonic::async_trait]
impl Evaluator for EvaluatorService {
    type EvaluateStream = GrpcStream<EvaluateResponse>;

    async fn evaluate(
        &self,
        request: Request<Streaming<EvaluateRequest>>,
    ) -> Result<Response<Self::EvaluateStream>, Status> {
        Ok(Response::new(pass_through(request.into_inner()).boxed()))
    }
}

/// Serve the evaluator until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tracing::info!("Evaluator listening on {}", addr);

    Server::builder()
        .concurrency_limit_per_connection(MAX_CONCURRENT_CALLS)
        .add_service(EvaluatorServer::new(EvaluatorService))
        .serve_with_shutdown(addr, shutdown)
        .await
        .context("Evaluator server failed")
}
