//! Matchmaking smoke test
//!
//! Creates one ticket, waits for it to be assigned, then deletes it.
//! Exits 0 when a match was found and 1 otherwise.

use std::sync::Arc;

use anyhow::{Context, Result};
use matchmaker_core::common::init_tracing;
use matchmaker_core::domains::tickets::TicketClient;
use matchmaker_core::kernel::GrpcFrontendClient;
use matchmaker_core::TestClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info,matchmaker_core=debug");

    let config = TestClientConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(frontend = %config.frontend_addr, "Matchmaking test client");

    let client = TicketClient::new(
        Arc::new(GrpcFrontendClient::new(config.frontend_addr.clone())),
        config.assignment_timeout,
    );
    let code = client.run().await;

    std::process::exit(code);
}
