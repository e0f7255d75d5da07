//! In-memory monitor store (no persistence)
//!
//! Useful for:
//! - Tests without database dependencies
//! - Running the service with `"backend": "none"`
//!
//! All data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::backend::{HealthStatus, MonitorStore};
use super::error::{StoreError, StoreResult};
use crate::monitor::{CheckResult, MonitorChanges, MonitorDef};

/// In-memory store keyed by monitor id
///
/// Every mutation runs under a single write lock, which makes
/// `apply_check_result` atomic with respect to all other operations.
#[derive(Default)]
pub struct MemoryStore {
    monitors: RwLock<HashMap<String, MonitorDef>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored monitors
    pub async fn len(&self) -> usize {
        self.monitors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.monitors.read().await.is_empty()
    }
}

#[async_trait]
impl MonitorStore for MemoryStore {
    async fn get_all(&self) -> StoreResult<Vec<MonitorDef>> {
        let monitors = self.monitors.read().await;
        Ok(monitors.values().cloned().collect())
    }

    async fn get_by_id(&self, monitor_id: &str) -> StoreResult<Option<MonitorDef>> {
        Ok(self.monitors.read().await.get(monitor_id).cloned())
    }

    #[instrument(skip(self, result), fields(status = %result.status))]
    async fn apply_check_result(
        &self,
        monitor_id: &str,
        result: &CheckResult,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut monitors = self.monitors.write().await;
        let def = monitors
            .get_mut(monitor_id)
            .ok_or_else(|| StoreError::NotFound(monitor_id.to_string()))?;

        def.record_check(result, timestamp);
        debug!(
            consecutive_fails = def.consecutive_fails,
            history = def.history.len(),
            "check result applied"
        );
        Ok(())
    }

    async fn insert_monitor(&self, def: &MonitorDef) -> StoreResult<()> {
        let mut monitors = self.monitors.write().await;
        if monitors.contains_key(&def.monitor_id) {
            return Err(StoreError::QueryFailed(format!(
                "monitor {} already exists",
                def.monitor_id
            )));
        }
        monitors.insert(def.monitor_id.clone(), def.clone());
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: &str) -> StoreResult<Vec<MonitorDef>> {
        let monitors = self.monitors.read().await;
        let mut owned: Vec<MonitorDef> = monitors
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.monitor_id.cmp(&b.monitor_id));
        Ok(owned)
    }

    async fn get_for_owner(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> StoreResult<Option<MonitorDef>> {
        let monitors = self.monitors.read().await;
        Ok(monitors
            .get(monitor_id)
            .filter(|m| m.owner_id == owner_id)
            .cloned())
    }

    async fn update_definition(
        &self,
        monitor_id: &str,
        changes: &MonitorChanges,
    ) -> StoreResult<()> {
        let mut monitors = self.monitors.write().await;
        let def = monitors
            .get_mut(monitor_id)
            .ok_or_else(|| StoreError::NotFound(monitor_id.to_string()))?;
        def.apply_changes(changes);
        Ok(())
    }

    async fn delete_monitor(&self, monitor_id: &str) -> StoreResult<bool> {
        Ok(self.monitors.write().await.remove(monitor_id).is_some())
    }

    async fn health_check(&self) -> StoreResult<HealthStatus> {
        let count = self.monitors.read().await.len();
        Ok(HealthStatus {
            healthy: true,
            message: "In-memory store operational".to_string(),
            metadata: HashMap::from([
                ("backend".to_string(), "memory".to_string()),
                ("monitors".to_string(), count.to_string()),
            ]),
        })
    }

    async fn close(&self) -> StoreResult<()> {
        debug!("closing in-memory store (no-op)");
        Ok(())
    }
}
