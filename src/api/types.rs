//! Request and response bodies of the REST API
//!
//! Field names follow the JSON the dashboard already consumes: camelCase,
//! with the check interval exposed as `interval`.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::monitor::{MonitorDef, MonitorStatus};

/// Envelope shared by error responses and plain acknowledgements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiMessage {
    /// HTTP status code, repeated in the body
    #[schema(example = 404)]
    pub code: u16,

    /// Canonical reason phrase
    #[schema(example = "Not Found")]
    pub status: String,

    #[schema(example = "Monitor not found or unauthorized")]
    pub message: String,
}

impl ApiMessage {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            status: reason(status),
            message: message.into(),
        }
    }
}

/// Reason phrase used in the `status` field
pub fn reason(status: StatusCode) -> String {
    match status {
        StatusCode::OK => "Success".to_string(),
        other => other.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Body of `POST /api/v1/monitors/new`
///
/// Every field is optional at the type level so that missing values get the
/// same messages as invalid ones.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateMonitorRequest {
    #[schema(example = "My API Health Check")]
    pub name: Option<String>,

    #[schema(example = "https://api.example.com/health")]
    pub url: Option<String>,

    /// Seconds between checks, as a number or numeric string
    #[schema(value_type = Option<u64>, example = 60)]
    pub interval: Option<serde_json::Value>,
}

/// Body of `PATCH /api/v1/monitors/{monitorId}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMonitorRequest {
    #[schema(example = "Updated API Name")]
    pub name: Option<String>,

    #[schema(example = "https://api.example.com/v2/health")]
    pub url: Option<String>,

    /// Absent means unchanged; an explicit `null` is validated like any value
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<u64>, example = 300)]
    pub interval: Option<serde_json::Value>,
}

/// Keeps a JSON `null` as `Some(Value::Null)` instead of folding it into `None`
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// The definition part of a monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSummary {
    pub monitor_id: String,
    pub name: String,
    pub url: String,
    pub interval: u64,
    pub status: MonitorStatus,
}

impl From<&MonitorDef> for MonitorSummary {
    fn from(def: &MonitorDef) -> Self {
        Self {
            monitor_id: def.monitor_id.clone(),
            name: def.name.clone(),
            url: def.url.clone(),
            interval: def.interval_secs,
            status: def.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMonitorResponse {
    #[schema(example = 201)]
    pub code: u16,
    #[schema(example = "Created")]
    pub status: String,
    pub message: String,
    pub monitor: MonitorSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonitorListResponse {
    #[schema(example = 200)]
    pub code: u16,
    #[schema(example = "Success")]
    pub status: String,
    pub monitors: Vec<MonitorDef>,
}

/// Only the fields an update actually changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFields {
    pub monitor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMonitorResponse {
    #[schema(example = 200)]
    pub code: u16,
    #[schema(example = "Success")]
    pub status: String,
    pub message: String,
    pub monitor: ChangedFields,
}

/// Liveness of the process
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,

    /// RFC 3339 time of the response
    pub timestamp: String,

    /// Seconds since the server started
    pub uptime: f64,
}
