//! Monitor store trait definition
//!
//! This module defines the `MonitorStore` trait that every persistence
//! backend implements. The scheduler only needs the first three methods; the
//! remaining ones serve the CRUD layer and process maintenance.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreResult;
use crate::monitor::{CheckResult, MonitorChanges, MonitorDef};

/// Health status of the store
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,

    /// Additional backend-specific metadata
    pub metadata: HashMap<String, String>,
}

/// Durable storage of monitor definitions and check results
///
/// Implementations must be `Send + Sync`; the scheduler shares one instance
/// between every trigger as `Arc<dyn MonitorStore>`.
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Load every persisted monitor, history included
    async fn get_all(&self) -> StoreResult<Vec<MonitorDef>>;

    /// Load one monitor by id
    async fn get_by_id(&self, monitor_id: &str) -> StoreResult<Option<MonitorDef>>;

    /// Persist the outcome of one check
    ///
    /// Must atomically set status, last check time, last response time and the
    /// failure counter (reset on Up, persisted value + 1 on Down), append one
    /// history entry and trim history to the newest
    /// [`HISTORY_LIMIT`](crate::monitor::HISTORY_LIMIT) entries.
    ///
    /// Returns [`StoreError::NotFound`](super::StoreError::NotFound) if the
    /// monitor no longer exists.
    async fn apply_check_result(
        &self,
        monitor_id: &str,
        result: &CheckResult,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Persist a newly created monitor
    async fn insert_monitor(&self, def: &MonitorDef) -> StoreResult<()>;

    /// All monitors belonging to one owner
    async fn list_for_owner(&self, owner_id: &str) -> StoreResult<Vec<MonitorDef>>;

    /// One monitor, only if it belongs to the owner
    async fn get_for_owner(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> StoreResult<Option<MonitorDef>>;

    /// Update name, url and interval; telemetry fields are never touched
    async fn update_definition(&self, monitor_id: &str, changes: &MonitorChanges)
    -> StoreResult<()>;

    /// Delete a monitor and its history, returning whether it existed
    async fn delete_monitor(&self, monitor_id: &str) -> StoreResult<bool>;

    /// Lightweight check that the backend is reachable
    async fn health_check(&self) -> StoreResult<HealthStatus>;

    /// Close the backend and release resources
    async fn close(&self) -> StoreResult<()>;
}
