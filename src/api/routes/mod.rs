//! API route handlers

pub mod health;
pub mod monitors;

use crate::api::error::ApiError;

/// Fallback for any route that does not exist
pub async fn not_found() -> ApiError {
    ApiError::unknown_endpoint()
}
