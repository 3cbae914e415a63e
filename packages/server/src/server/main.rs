// Main entry point for the game front door

use std::sync::Arc;

use anyhow::{Context, Result};
use matchmaker_core::common::{init_tracing, shutdown_signal};
use matchmaker_core::domains::auth::TokenSigner;
use matchmaker_core::kernel::GrpcFrontendClient;
use matchmaker_core::server::{build_app, AppState};
use matchmaker_core::FrontendConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info,matchmaker_core=debug,tower_http=info");

    tracing::info!("Starting game front door");

    let config = FrontendConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        frontend = %config.frontend_addr,
        assignment_timeout_secs = config.assignment_timeout.as_secs(),
        "Configuration loaded"
    );

    // Signing context must exist before the first request
    let signer = TokenSigner::from_config(&config.jwt).context("Failed to set up token signing")?;
    tracing::info!(algorithm = ?signer.algorithm(), "Token signer ready");

    let state = AppState::new(
        Arc::new(GrpcFrontendClient::new(config.frontend_addr.clone())),
        signer,
        &config.bearer_token,
        config.assignment_timeout,
    );
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
