//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use callflow_core::landing::LandingError;
use callflow_shared::AppError;
use serde_json::json;
use tracing::error;

/// Error returned by handlers, rendered as `{"error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<LandingError> for ApiError {
    fn from(err: LandingError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the log.
        let message = match &self.0 {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %self.0, "request failed");
                "An internal error occurred".to_string()
            }
            AppError::ExternalService(_) => {
                error!(error = %self.0, "image storage request failed");
                "Image storage request failed".to_string()
            }
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::ServiceUnavailable(msg) => msg.clone(),
        };

        (
            status,
            Json(json!({ "error": self.0.error_code(), "message": message })),
        )
            .into_response()
    }
}
