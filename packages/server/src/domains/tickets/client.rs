//! Ticket lifecycle helpers over the frontend service.

use std::sync::Arc;
use std::time::Duration;

use open_match_api::{SearchFields, Ticket};
use tonic::{Code, Status};

use super::{wait_for_assignment, ServerInfo};
use crate::kernel::{log_status, BaseFrontendService};

/// Deadline for the unary ticket calls.
pub const TICKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Create `ticket` and return it with the id the backend gave it.
pub async fn create_ticket(
    frontend: &dyn BaseFrontendService,
    ticket: Ticket,
) -> Result<Ticket, Status> {
    let created = frontend.create_ticket(ticket, TICKET_TIMEOUT).await?;
    tracing::info!(ticket_id = %created.id, "Created ticket");
    Ok(created)
}

/// Outcome of one create-and-wait round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub ticket_id: String,
    pub server: Option<ServerInfo>,
}

/// Smoke-test client: one ticket, wait, clean up.
pub struct TicketClient {
    frontend: Arc<dyn BaseFrontendService>,
    assignment_timeout: Duration,
}

impl TicketClient {
    pub fn new(frontend: Arc<dyn BaseFrontendService>, assignment_timeout: Duration) -> Self {
        Self {
            frontend,
            assignment_timeout,
        }
    }

    /// Create an untagged ticket and wait for its assignment.
    pub async fn create_ticket_and_wait(&self) -> Result<MatchResult, Status> {
        let ticket = Ticket {
            search_fields: Some(SearchFields::default()),
            ..Default::default()
        };
        let ticket_id = create_ticket(self.frontend.as_ref(), ticket).await?.id;

        tracing::info!(
            ticket_id = %ticket_id,
            timeout_secs = self.assignment_timeout.as_secs(),
            "Waiting for assignment"
        );
        let server =
            wait_for_assignment(self.frontend.as_ref(), &ticket_id, self.assignment_timeout).await;

        Ok(MatchResult { ticket_id, server })
    }

    /// `None` when the ticket is gone or the call failed.
    pub async fn get_ticket(&self, ticket_id: &str) -> Option<Ticket> {
        match self.frontend.get_ticket(ticket_id, TICKET_TIMEOUT).await {
            Ok(ticket) => Some(ticket),
            Err(status) => {
                if status.code() != Code::NotFound {
                    log_status("GetTicket", &status);
                }
                None
            }
        }
    }

    pub async fn delete_ticket(&self, ticket_id: &str) -> bool {
        match self.frontend.delete_ticket(ticket_id, TICKET_TIMEOUT).await {
            Ok(()) => {
                tracing::info!(ticket_id, "Deleted ticket");
                true
            }
            Err(status) => {
                log_status("DeleteTicket", &status);
                false
            }
        }
    }

    /// Full round. Returns the process exit code: 0 on a match, 1 otherwise.
    pub async fn run(&self) -> i32 {
        let result = match self.create_ticket_and_wait().await {
            Ok(result) => result,
            Err(status) => {
                log_status("CreateTicket", &status);
                tracing::error!("Failed to create ticket");
                return 1;
            }
        };

        let code = match &result.server {
            Some(server) => {
                tracing::info!(
                    ticket_id = %result.ticket_id,
                    connection = %server.connection,
                    "Match found"
                );
                0
            }
            None => {
                tracing::error!(ticket_id = %result.ticket_id, "No match found before timeout");
                1
            }
        };

        self.delete_ticket(&result.ticket_id).await;
        code
    }
}
