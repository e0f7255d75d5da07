//! OpenAPI document served at `/api/docs/openapi.json`

use utoipa::OpenApi;

use crate::api::routes;
use crate::api::types::{
    ApiMessage, ChangedFields, CreateMonitorRequest, CreateMonitorResponse, HealthResponse,
    MonitorListResponse, MonitorSummary, UpdateMonitorRequest, UpdateMonitorResponse,
};
use crate::monitor::{CheckStatus, HistoryEntry, MonitorDef, MonitorStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PulseWatch API",
        description = "Register HTTP endpoints and track their uptime, response time and check history"
    ),
    paths(
        routes::health::health_check,
        routes::monitors::create_monitor,
        routes::monitors::list_monitors,
        routes::monitors::update_monitor,
        routes::monitors::delete_monitor,
    ),
    components(schemas(
        ApiMessage,
        ChangedFields,
        CheckStatus,
        CreateMonitorRequest,
        CreateMonitorResponse,
        HealthResponse,
        HistoryEntry,
        MonitorDef,
        MonitorListResponse,
        MonitorStatus,
        MonitorSummary,
        UpdateMonitorRequest,
        UpdateMonitorResponse,
    )),
    tags(
        (name = "Monitors", description = "API endpoint monitoring and management"),
        (name = "Admin", description = "Service health"),
    )
)]
pub struct ApiDoc;
