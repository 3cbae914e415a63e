//! Assignment commit step.

use std::time::Duration;

use open_match_api::{AssignTicketsRequest, Assignment, AssignmentGroup, Match};

use crate::kernel::{log_status, BaseBackendService};

/// Group every ticket of `m` under one connection.
///
/// `None` for a match without tickets; nothing should be sent for it.
pub fn assignment_group(m: &Match, connection: &str) -> Option<AssignmentGroup> {
    if m.tickets.is_empty() {
        return None;
    }

    Some(AssignmentGroup {
        ticket_ids: m.ticket_ids(),
        assignment: Some(Assignment {
            connection: connection.to_string(),
        }),
    })
}

/// Send the assignment for one match. Returns whether the backend accepted it.
///
/// Per-ticket failures in the response are logged but do not fail the call.
pub async fn assign_tickets(
    backend: &dyn BaseBackendService,
    m: &Match,
    connection: &str,
    timeout: Duration,
) -> bool {
    let Some(group) = assignment_group(m, connection) else {
        tracing::warn!(match_id = %m.match_id, "Match has no tickets, skipping assignment");
        return false;
    };

    let request = AssignTicketsRequest {
        assignments: vec![group],
    };

    match backend.assign_tickets(request, timeout).await {
        Ok(response) => {
            for failure in &response.failures {
                tracing::warn!(
                    match_id = %m.match_id,
                    ticket_id = %failure.ticket_id,
                    cause = ?failure.cause(),
                    "Ticket assignment failed"
                );
            }
            true
        }
        Err(status) => {
            log_status("AssignTickets", &status);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockBackend;
    use open_match_api::Ticket;
    use tonic::Code;

    fn two_player_match() -> Match {
        Match {
            match_id: "match-1".to_string(),
            tickets: vec![
                Ticket {
                    id: "a".to_string(),
                    ..Default::default()
                },
                Ticket {
                    id: "b".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_group_carries_all_ticket_ids() {
        let group = assignment_group(&two_player_match(), "10.0.0.5:7777").unwrap();
        assert_eq!(group.ticket_ids, vec!["a", "b"]);
        assert_eq!(group.assignment.unwrap().connection, "10.0.0.5:7777");
    }

    #[test]
    fn test_group_rejects_empty_match() {
        assert!(assignment_group(&Match::default(), "10.0.0.5:7777").is_none());
    }

    #[tokio::test]
    async fn test_empty_match_never_reaches_backend() {
        let backend = MockBackend::new();
        let ok = assign_tickets(&backend, &Match::default(), "x:1", Duration::from_secs(10)).await;

        assert!(!ok);
        assert!(backend.assign_calls().is_empty());
    }

    #[tokio::test]
    async fn test_assign_success_and_failure() {
        let backend = MockBackend::new();
        assert!(
            assign_tickets(&backend, &two_player_match(), "x:1", Duration::from_secs(10)).await
        );
        assert_eq!(backend.assign_calls().len(), 1);

        let backend = MockBackend::new().with_assign_error(Code::DeadlineExceeded, "slow");
        assert!(
            !assign_tickets(&backend, &two_player_match(), "x:1", Duration::from_secs(10)).await
        );
    }

    #[tokio::test]
    async fn test_per_ticket_failures_still_count_as_sent() {
        let backend = MockBackend::new().with_assign_failures(&["b"]);
        assert!(
            assign_tickets(&backend, &two_player_match(), "x:1", Duration::from_secs(10)).await
        );
    }
}
