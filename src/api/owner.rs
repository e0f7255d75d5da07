//! Owner identity of a request
//!
//! Authentication happens in front of this service; the authenticated
//! account id arrives in the `X-Owner-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::error::ApiError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// Account that owns the monitors a request touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| OwnerId(value.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("Missing X-Owner-Id header".to_string()))
    }
}
