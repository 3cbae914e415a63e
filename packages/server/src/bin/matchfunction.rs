//! Match function server
//!
//! Pairs waiting tickets two at a time for every profile the backend asks about.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use matchmaker_core::common::{init_tracing, shutdown_signal};
use matchmaker_core::domains::matchfunction::{serve, MatchFunctionService};
use matchmaker_core::kernel::GrpcQueryClient;
use matchmaker_core::MatchFunctionConfig;

#[derive(Parser)]
#[command(name = "matchfunction")]
#[command(about = "Open Match match function (two-player pairing)")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 50502)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("info,matchmaker_core=debug");

    let config = MatchFunctionConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(query = %config.query_addr, "Configuration loaded");

    let service = MatchFunctionService::new(
        Arc::new(GrpcQueryClient::new(config.query_addr.clone())),
        config.query_timeout,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    serve(service, addr, shutdown_signal()).await
}
