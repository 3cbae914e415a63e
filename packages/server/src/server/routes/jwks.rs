use axum::extract::State;
use axum::Json;
use jsonwebtoken::jwk::JwkSet;

use crate::server::{ApiError, AppState};

/// Public verification keys. Only published when tokens are RS256-signed.
pub async fn jwks_handler(State(state): State<AppState>) -> Result<Json<JwkSet>, ApiError> {
    state
        .signer
        .jwks()
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound)
}
