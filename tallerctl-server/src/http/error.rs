//! API error types with IntoResponse.
//!
//! Errors are converted to JSON responses with appropriate status
//! codes. Infrastructure failures are logged with their internal
//! detail and surfaced to clients as an opaque generic server error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tallerctl_core::CoreError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request data missing or malformed (400)
    MissingEmail,

    /// Database/pool/connection failure (500, logged)
    Infrastructure(CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingEmail => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Email requerido" }),
            ),
            Self::Infrastructure(e) => {
                // Log the actual error, return a generic message
                tracing::error!("infrastructure error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Error de servidor" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidInput { .. } => Self::MissingEmail,
            other => Self::Infrastructure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_email_is_400() {
        let response = ApiError::MissingEmail.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pool_exhaustion_is_opaque_500() {
        let response = ApiError::Infrastructure(CoreError::PoolExhausted).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn invalid_input_maps_to_400() {
        let err: ApiError = CoreError::invalid_input("email must not be empty").into();
        assert!(matches!(err, ApiError::MissingEmail));
    }

    #[tokio::test]
    async fn query_error_maps_to_500() {
        let err: ApiError = CoreError::query("relation does not exist").into();
        assert!(matches!(err, ApiError::Infrastructure(_)));
    }
}
