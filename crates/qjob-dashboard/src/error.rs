//! Error types for the dashboard API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qjob_assistant::AssistantError;
use qjob_core::CoreError;
use qjob_hal::HalError;
use serde::Serialize;

/// API error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Assistant error: {0}")]
    AssistantError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::BackendError(_) => (StatusCode::BAD_GATEWAY, "backend_error"),
            ApiError::AssistantError(_) => (StatusCode::BAD_GATEWAY, "assistant_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            CoreError::BatchRunning => ApiError::Conflict(e.to_string()),
            CoreError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
            CoreError::Backend(e) => e.into(),
            CoreError::Assistant(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<HalError> for ApiError {
    fn from(e: HalError) -> Self {
        match e {
            HalError::AuthenticationFailed(_) => ApiError::Unauthorized(e.to_string()),
            HalError::UnknownBackend(_) => ApiError::NotFound(e.to_string()),
            other => ApiError::BackendError(other.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(e: AssistantError) -> Self {
        match e {
            AssistantError::MissingApiKey => ApiError::BadRequest(e.to_string()),
            AssistantError::UnknownQuickAction(_) => ApiError::NotFound(e.to_string()),
            AssistantError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
            other => ApiError::AssistantError(other.to_string()),
        }
    }
}
