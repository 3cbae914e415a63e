use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::domains::auth::check_bearer;
use crate::server::{ApiError, AppState};

/// Bearer token middleware
///
/// Rejects the request with 401 before the handler runs unless the
/// `Authorization` header carries the configured token.
pub async fn bearer_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !check_bearer(header, &state.bearer_token) {
        tracing::debug!(path = %request.uri().path(), "Rejected request without valid bearer token");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
