//! Evaluator server
//!
//! Approves every proposal it is sent.

use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use matchmaker_core::common::{init_tracing, shutdown_signal};
use matchmaker_core::domains::evaluator::serve;

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Open Match pass-through evaluator")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 50508)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("info,matchmaker_core=debug");

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    serve(addr, shutdown_signal()).await
}
