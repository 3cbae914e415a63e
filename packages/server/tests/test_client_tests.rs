//! Test client against a mocked frontend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use matchmaker_core::domains::tickets::TicketClient;
use matchmaker_core::kernel::MockFrontend;

use crate::common::init_test_tracing;

#[tokio::test]
async fn test_match_found_exits_zero_and_cleans_up() {
    init_test_tracing();
    let frontend = Arc::new(MockFrontend::new().with_assignment("34.1.2.3:7654"));
    let client = TicketClient::new(frontend.clone(), Duration::from_secs(5));

    assert_eq!(client.run().await, 0);

    let created = frontend.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].search_fields.as_ref().unwrap().tags.is_empty());
    assert_eq!(frontend.deleted(), vec![created[0].id.clone()]);
}

#[tokio::test(start_paused = true)]
async fn test_no_match_exits_one_and_cleans_up() {
    init_test_tracing();
    let frontend = Arc::new(MockFrontend::new());
    let client = TicketClient::new(frontend.clone(), Duration::from_secs(60));

    assert_eq!(client.run().await, 1);
    assert_eq!(frontend.deleted(), vec!["ticket-1"]);
}
