//! Health check endpoint

use axum::Json;
use axum::extract::State;
use chrono::{SecondsFormat, Utc};

use crate::api::state::ApiState;
use crate::api::types::HealthResponse;

/// GET /api/admin/health
///
/// Returns a simple liveness response with the process uptime
#[utoipa::path(
    get,
    path = "/api/admin/health",
    tag = "Admin",
    responses((status = 200, description = "Server is running", body = HealthResponse))
)]
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime().as_secs_f64(),
    })
}
