//! Monitor management endpoints
//!
//! Every handler writes to the store first and only then tells the
//! scheduler, so a trigger never reads a definition older than the one the
//! client was acknowledged with.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::owner::OwnerId;
use crate::api::state::ApiState;
use crate::api::types::{
    ApiMessage, ChangedFields, CreateMonitorRequest, CreateMonitorResponse, MonitorListResponse,
    MonitorSummary, UpdateMonitorRequest, UpdateMonitorResponse, reason,
};
use crate::api::validation::{self, ValidationError};
use crate::monitor::{CREATE_INTERVALS, MonitorChanges, MonitorDef, UPDATE_INTERVALS};

/// POST /api/v1/monitors/new
///
/// Create a monitor and start checking it
#[utoipa::path(
    post,
    path = "/api/v1/monitors/new",
    tag = "Monitors",
    params(("X-Owner-Id" = String, Header, description = "Account owning the monitor")),
    request_body = CreateMonitorRequest,
    responses(
        (status = 201, description = "Monitor created successfully", body = CreateMonitorResponse),
        (status = 400, description = "Validation error", body = ApiMessage),
        (status = 401, description = "Missing owner identity", body = ApiMessage),
    )
)]
#[instrument(skip_all, fields(owner_id = %owner.0))]
pub async fn create_monitor(
    State(state): State<ApiState>,
    owner: OwnerId,
    payload: Result<Json<CreateMonitorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateMonitorResponse>)> {
    let Json(request) = payload?;

    let name = validation::require_name(request.name.as_deref())?;
    let url = validation::require_url(request.url.as_deref())?;
    let interval_secs = validation::require_interval(request.interval.as_ref(), &CREATE_INTERVALS)?;

    let def = MonitorDef::new(owner.0, name, url, interval_secs);
    state.store.insert_monitor(&def).await?;
    let cadence = state.scheduler.on_monitor_created(&def);
    info!(monitor_id = %def.monitor_id, "monitor created, checking {cadence}");

    Ok((
        StatusCode::CREATED,
        Json(CreateMonitorResponse {
            code: StatusCode::CREATED.as_u16(),
            status: reason(StatusCode::CREATED),
            message: "Monitor created successfully".to_string(),
            monitor: MonitorSummary::from(&def),
        }),
    ))
}

/// GET /api/v1/monitors/get
///
/// List the caller's monitors with their latest state and history
#[utoipa::path(
    get,
    path = "/api/v1/monitors/get",
    tag = "Monitors",
    params(("X-Owner-Id" = String, Header, description = "Account owning the monitors")),
    responses(
        (status = 200, description = "Monitors retrieved successfully", body = MonitorListResponse),
        (status = 401, description = "Missing owner identity", body = ApiMessage),
    )
)]
#[instrument(skip_all, fields(owner_id = %owner.0))]
pub async fn list_monitors(
    State(state): State<ApiState>,
    owner: OwnerId,
) -> ApiResult<Json<MonitorListResponse>> {
    let monitors = state.store.list_for_owner(&owner.0).await?;

    Ok(Json(MonitorListResponse {
        code: StatusCode::OK.as_u16(),
        status: reason(StatusCode::OK),
        monitors,
    }))
}

/// PATCH /api/v1/monitors/{monitorId}
///
/// Change name, url or interval; only changed fields are echoed back
#[utoipa::path(
    patch,
    path = "/api/v1/monitors/{monitorId}",
    tag = "Monitors",
    params(
        ("monitorId" = String, Path, description = "Unique monitor ID"),
        ("X-Owner-Id" = String, Header, description = "Account owning the monitor"),
    ),
    request_body = UpdateMonitorRequest,
    responses(
        (status = 200, description = "Monitor updated successfully", body = UpdateMonitorResponse),
        (status = 400, description = "Validation error", body = ApiMessage),
        (status = 401, description = "Missing owner identity", body = ApiMessage),
        (status = 404, description = "Monitor not found or unauthorized", body = ApiMessage),
    )
)]
#[instrument(skip_all, fields(owner_id = %owner.0, monitor_id = %monitor_id))]
pub async fn update_monitor(
    State(state): State<ApiState>,
    owner: OwnerId,
    Path(monitor_id): Path<String>,
    payload: Result<Json<UpdateMonitorRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateMonitorResponse>> {
    let Json(request) = payload?;

    let current = state
        .store
        .get_for_owner(&owner.0, &monitor_id)
        .await?
        .ok_or_else(ApiError::monitor_not_found)?;

    let changes = diff_definition(&current, &request)?;

    if !changes.is_empty() {
        state
            .store
            .update_definition(&current.monitor_id, &changes)
            .await?;

        if state
            .scheduler
            .on_monitor_updated(&current.monitor_id, &changes)
            .await?
        {
            info!("monitor rescheduled");
        }
    }

    Ok(Json(UpdateMonitorResponse {
        code: StatusCode::OK.as_u16(),
        status: reason(StatusCode::OK),
        message: "Monitor updated successfully".to_string(),
        monitor: ChangedFields {
            monitor_id: current.monitor_id,
            name: changes.name,
            url: changes.url,
            interval: changes.interval_secs,
        },
    }))
}

/// DELETE /api/v1/monitors/{monitorId}
///
/// Delete a monitor with its history and stop checking it
#[utoipa::path(
    delete,
    path = "/api/v1/monitors/{monitorId}",
    tag = "Monitors",
    params(
        ("monitorId" = String, Path, description = "Monitor ID to delete"),
        ("X-Owner-Id" = String, Header, description = "Account owning the monitor"),
    ),
    responses(
        (status = 200, description = "Monitor deleted successfully", body = ApiMessage),
        (status = 401, description = "Missing owner identity", body = ApiMessage),
        (status = 404, description = "Monitor not found or unauthorized", body = ApiMessage),
    )
)]
#[instrument(skip_all, fields(owner_id = %owner.0, monitor_id = %monitor_id))]
pub async fn delete_monitor(
    State(state): State<ApiState>,
    owner: OwnerId,
    Path(monitor_id): Path<String>,
) -> ApiResult<Json<ApiMessage>> {
    let current = state
        .store
        .get_for_owner(&owner.0, &monitor_id)
        .await?
        .ok_or_else(ApiError::monitor_not_found)?;

    if !state.store.delete_monitor(&current.monitor_id).await? {
        return Err(ApiError::monitor_not_found());
    }
    state.scheduler.on_monitor_deleted(&current.monitor_id);
    info!("monitor deleted");

    Ok(Json(ApiMessage::new(
        StatusCode::OK,
        "Monitor deleted successfully",
    )))
}

/// Fields of `request` that differ from `current`, validated
///
/// Blank name or url values are ignored rather than rejected.
fn diff_definition(
    current: &MonitorDef,
    request: &UpdateMonitorRequest,
) -> Result<MonitorChanges, ValidationError> {
    let mut changes = MonitorChanges::default();

    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    if !name.is_empty() && name != current.name {
        changes.name = Some(name.to_string());
    }

    let url = request.url.as_deref().map(str::trim).unwrap_or_default();
    if !url.is_empty() {
        if !validation::is_valid_url(url) {
            return Err(ValidationError::InvalidUrl);
        }
        if url != current.url {
            changes.url = Some(url.to_string());
        }
    }

    if let Some(interval) = &request.interval {
        let interval_secs = validation::parse_interval(interval, &UPDATE_INTERVALS)?;
        if interval_secs != current.interval_secs {
            changes.interval_secs = Some(interval_secs);
        }
    }

    Ok(changes)
}
