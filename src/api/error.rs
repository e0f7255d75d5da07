//! API error types and conversions

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::api::types::ApiMessage;
use crate::api::validation::ValidationError;
use crate::storage::StoreError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned to clients for any internal failure
pub const SERVER_ERROR_MESSAGE: &str = "Server error try again later...";

/// Message returned when a monitor is missing or owned by someone else
pub const MONITOR_NOT_FOUND_MESSAGE: &str = "Monitor not found or unauthorized";

/// Message returned for unknown routes
pub const UNKNOWN_ENDPOINT_MESSAGE: &str =
    "This endpoint doesn't exist, Visit /api/docs for API documentation.";

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request body or parameters
    BadRequest(String),

    /// No owner identity on the request
    Unauthorized(String),

    /// Resource not found
    NotFound(String),

    /// Store failure; details are logged, never sent to the client
    Internal(String),
}

impl ApiError {
    pub fn monitor_not_found() -> Self {
        ApiError::NotFound(MONITOR_NOT_FOUND_MESSAGE.to_string())
    }

    pub fn unknown_endpoint() -> Self {
        ApiError::NotFound(UNKNOWN_ENDPOINT_MESSAGE.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Internal(detail) => {
                error!("request failed: {detail}");
                SERVER_ERROR_MESSAGE.to_string()
            }
        };

        (status, Json(ApiMessage::new(status, message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
