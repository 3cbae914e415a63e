//! Match stream consumer.

use std::time::Duration;

use open_match_api::{FetchMatchesRequest, FunctionConfig, Match, MatchProfile};

use crate::kernel::{log_status, BaseBackendService, DeadlineStream};

/// Fetch this cycle's match proposals.
///
/// Never fails: opening errors, transport errors and an elapsed deadline all
/// end collection and return whatever arrived so far. Responses without a
/// match, or with a match that has no tickets, are dropped.
pub async fn fetch_matches(
    backend: &dyn BaseBackendService,
    config: FunctionConfig,
    profile: MatchProfile,
    timeout: Duration,
) -> Vec<Match> {
    let profile_name = profile.name.clone();
    let request = FetchMatchesRequest {
        config: Some(config),
        profile: Some(profile),
    };

    let stream = match backend.fetch_matches(request, timeout).await {
        Ok(stream) => stream,
        Err(status) => {
            log_status("FetchMatches", &status);
            return Vec::new();
        }
    };

    let mut responses = DeadlineStream::with_timeout(stream, timeout, "FetchMatches");
    let mut matches = Vec::new();

    while let Some(response) = responses.next().await {
        match response.r#match {
            Some(m) if !m.tickets.is_empty() => {
                tracing::debug!(
                    match_id = %m.match_id,
                    tickets = m.tickets.len(),
                    "Received match proposal"
                );
                matches.push(m);
            }
            _ => tracing::trace!("Dropping empty FetchMatches response"),
        }
    }

    tracing::debug!(
        profile = %profile_name,
        count = matches.len(),
        end = ?responses.end(),
        "FetchMatches finished"
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::director::{build_profile, function_config};
    use crate::kernel::MockBackend;
    use open_match_api::Ticket;
    use tonic::Code;

    fn proposal(id: &str, tickets: &[&str]) -> Match {
        Match {
            match_id: id.to_string(),
            tickets: tickets
                .iter()
                .map(|t| Ticket {
                    id: t.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    async fn fetch(backend: &MockBackend) -> Vec<Match> {
        fetch_matches(
            backend,
            function_config("mmf", 50502),
            build_profile("p", &["everyone".to_string()]),
            Duration::from_secs(30),
        )
        .await
    }

    #[tokio::test]
    async fn test_filters_matches_without_tickets() {
        let backend = MockBackend::new().with_matches(vec![
            proposal("m1", &["a", "b"]),
            proposal("empty", &[]),
            proposal("m2", &["c", "d"]),
        ]);

        let matches = fetch(&backend).await;
        let ids: Vec<_> = matches.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);

        let calls = backend.fetch_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].profile.as_ref().unwrap().name, "p");
        assert_eq!(calls[0].config.as_ref().unwrap().port, 50502);
    }

    #[tokio::test]
    async fn test_unavailable_backend_yields_empty_list() {
        let backend = MockBackend::new().with_fetch_error(Code::Unavailable, "connection refused");
        assert!(fetch(&backend).await.is_empty());
    }

    #[tokio::test]
    async fn test_stream_error_keeps_partial_result() {
        let backend = MockBackend::new()
            .with_matches(vec![proposal("m1", &["a", "b"])])
            .with_stream_error(Code::Internal, "boom");

        let matches = fetch(&backend).await;
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_what_arrived() {
        let backend = MockBackend::new()
            .with_matches(vec![proposal("m1", &["a", "b"])])
            .hanging();

        let matches = fetch(&backend).await;
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_stream_yields_empty_list() {
        let backend = MockBackend::new().hanging();
        assert!(fetch(&backend).await.is_empty());
    }
}
