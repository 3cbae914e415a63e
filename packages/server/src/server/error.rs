use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tonic::Status;

/// Failures a front door handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("No match found within timeout period")]
    AssignmentTimeout { ticket_id: String },

    #[error("Not found")]
    NotFound,

    #[error("gRPC error: {}", .0.message())]
    Grpc(#[from] Status),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::AssignmentTimeout { ticket_id } => {
                tracing::warn!(ticket_id = %ticket_id, "Assignment timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    Json(json!({
                        "status": "timeout",
                        "ticket_id": ticket_id,
                        "message": "No match found within timeout period",
                    })),
                )
                    .into_response()
            }
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Not found" })),
            )
                .into_response(),
            Self::Grpc(status) => {
                tracing::error!(
                    code = ?status.code(),
                    message = status.message(),
                    "gRPC error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("gRPC error: {}", status.message()) })),
                )
                    .into_response()
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::AssignmentTimeout {
                ticket_id: "t".to_string()
            }
            .into_response()
            .status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ApiError::from(Status::unavailable("down"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
