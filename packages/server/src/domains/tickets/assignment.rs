use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kernel::{log_status, BaseFrontendService, DeadlineStream};

/// Game server a ticket was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub ip: String,
    pub port: String,
    pub connection: String,
}

impl ServerInfo {
    /// Split `host:port` at the last colon. Without a colon the port is empty.
    pub fn from_connection(connection: &str) -> Self {
        let (ip, port) = connection.rsplit_once(':').unwrap_or((connection, ""));

        Self {
            ip: ip.to_string(),
            port: port.to_string(),
            connection: connection.to_string(),
        }
    }
}

/// Watch `ticket_id` until it carries a connection, or until `timeout`.
///
/// `None` when nothing arrived in time. A failed watch is logged and also
/// reported as `None`; the ticket stays with the backend either way.
pub async fn wait_for_assignment(
    frontend: &dyn BaseFrontendService,
    ticket_id: &str,
    timeout: Duration,
) -> Option<ServerInfo> {
    let stream = match frontend.watch_assignments(ticket_id, timeout).await {
        Ok(stream) => stream,
        Err(status) => {
            log_status("WatchAssignments", &status);
            return None;
        }
    };
    let mut updates = DeadlineStream::with_timeout(stream, timeout, "WatchAssignments");

    while let Some(update) = updates.next().await {
        let Some(assignment) = update.assignment else {
            continue;
        };
        if assignment.connection.is_empty() {
            continue;
        }

        tracing::info!(ticket_id, connection = %assignment.connection, "Ticket assigned");
        return Some(ServerInfo::from_connection(&assignment.connection));
    }

    tracing::warn!(ticket_id, end = ?updates.end(), "No assignment before timeout");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MockFrontend;
    use tonic::Code;

    #[test]
    fn test_server_info_split() {
        let info = ServerInfo::from_connection("10.0.0.5:7777");
        assert_eq!(info.ip, "10.0.0.5");
        assert_eq!(info.port, "7777");
        assert_eq!(info.connection, "10.0.0.5:7777");

        let info = ServerInfo::from_connection("[::1]:7777");
        assert_eq!(info.ip, "[::1]");
        assert_eq!(info.port, "7777");

        let info = ServerInfo::from_connection("gameserver.local");
        assert_eq!(info.ip, "gameserver.local");
        assert_eq!(info.port, "");
    }

    #[tokio::test]
    async fn test_skips_empty_assignment() {
        let frontend = MockFrontend::new().with_assignment("10.0.0.5:7777");
        let info = wait_for_assignment(&frontend, "ticket-1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(info.port, "7777");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_none() {
        let frontend = MockFrontend::new();
        let info = wait_for_assignment(&frontend, "ticket-1", Duration::from_secs(60)).await;
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn test_watch_error_yields_none() {
        let frontend = MockFrontend::new().with_watch_error(Code::Unavailable, "frontend down");
        let info = wait_for_assignment(&frontend, "ticket-1", Duration::from_secs(5)).await;
        assert!(info.is_none());
    }
}
