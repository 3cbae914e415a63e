//! Director
//!
//! Fetches match proposals from the Open Match backend on a fixed interval,
//! allocates an Agones game server per match and assigns its connection to
//! the match's tickets.

use anyhow::{Context, Result};
use matchmaker_core::common::{init_tracing, shutdown_signal};
use matchmaker_core::domains::director::{run_scheduler, Director, DirectorSettings};
use matchmaker_core::kernel::DirectorDeps;
use matchmaker_core::DirectorConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info,matchmaker_core=debug");

    let config = DirectorConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        backend = %config.backend_addr,
        match_function = %format!("{}:{}", config.match_function_host, config.match_function_port),
        allocator = ?config.allocator.mode,
        fleet = %config.allocator.fleet,
        namespace = %config.allocator.namespace,
        "Configuration loaded"
    );

    let deps = DirectorDeps::from_config(&config.backend_addr, &config.allocator)
        .context("Failed to set up director dependencies")?;
    let director = Director::new(deps, DirectorSettings::from(&config));

    run_scheduler(&director, config.fetch_interval, shutdown_signal()).await;

    Ok(())
}
