//! Deadline-bounded consumption of server-streaming RPCs.
//!
//! A [`DeadlineStream`] yields items until the stream closes, the deadline
//! passes, or the transport reports an error. All three end the sequence the
//! same way (`None`), so callers only ever see "here is the next item" or
//! "done". The reason is kept in [`DeadlineStream::end`] for logging and tests.
//! Dropping the stream cancels the underlying call.

use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;
use tonic::Status;

use super::grpc::log_status;
use super::traits::GrpcStream;

/// Why a [`DeadlineStream`] stopped yielding.
#[derive(Debug)]
pub enum StreamEnd {
    Closed,
    DeadlineElapsed,
    Failed(Status),
}

pub struct DeadlineStream<T> {
    inner: GrpcStream<T>,
    deadline: Instant,
    operation: &'static str,
    end: Option<StreamEnd>,
}

impl<T> DeadlineStream<T> {
    pub fn new(inner: GrpcStream<T>, deadline: Instant, operation: &'static str) -> Self {
        Self {
            inner,
            deadline,
            operation,
            end: None,
        }
    }

    pub fn with_timeout(inner: GrpcStream<T>, timeout: Duration, operation: &'static str) -> Self {
        Self::new(inner, Instant::now() + timeout, operation)
    }

    /// Next item, or `None` once the sequence has ended for any reason.
    pub async fn next(&mut self) -> Option<T> {
        if self.end.is_some() {
            return None;
        }

        match tokio::time::timeout_at(self.deadline, self.inner.next()).await {
            Ok(Some(Ok(item))) => Some(item),
            Ok(Some(Err(status))) => {
                log_status(self.operation, &status);
                self.end = Some(StreamEnd::Failed(status));
                None
            }
            Ok(None) => {
                self.end = Some(StreamEnd::Closed);
                None
            }
            Err(_) => {
                tracing::warn!(operation = self.operation, "Stream deadline elapsed");
                self.end = Some(StreamEnd::DeadlineElapsed);
                None
            }
        }
    }

    pub fn end(&self) -> Option<&StreamEnd> {
        self.end.as_ref()
    }

    /// Drain every remaining item.
    pub async fn collect(mut self) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item);
        }
        items
    }
}
