//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::AUTHORIZATION, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::TokenSigner;
use crate::kernel::BaseFrontendService;
use crate::server::middleware::bearer_auth;
use crate::server::routes::{health_handler, jwks_handler, play_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub frontend: Arc<dyn BaseFrontendService>,
    pub signer: Arc<TokenSigner>,
    pub bearer_token: Arc<str>,
    pub assignment_timeout: Duration,
}

impl AppState {
    pub fn new(
        frontend: Arc<dyn BaseFrontendService>,
        signer: TokenSigner,
        bearer_token: &str,
        assignment_timeout: Duration,
    ) -> Self {
        Self {
            frontend,
            signer: Arc::new(signer),
            bearer_token: Arc::from(bearer_token),
            assignment_timeout,
        }
    }
}

/// Build the Axum application router
///
/// `/play/:region` sits behind the bearer check; `/health` and the JWKS
/// document are public.
pub fn build_app(state: AppState) -> Router {
    let play = Router::new()
        .route("/play/:region", get(play_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_auth));

    // Game clients call from anywhere
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/.well-known/jwks.json", get(jwks_handler))
        .merge(play)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
