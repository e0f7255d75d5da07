//! Hooks the CRUD layer calls when monitor definitions change
//!
//! These keep the trigger table in step with the store. Each hook must be
//! called after the corresponding store write has completed.

use tracing::trace;

use super::cadence::Cadence;
use super::reconcile::BootReconciler;
use super::registry::SchedulerRegistry;
use crate::monitor::{MonitorChanges, MonitorDef};
use crate::storage::StoreResult;

impl SchedulerRegistry {
    /// A monitor was persisted; start checking it
    pub fn on_monitor_created(&self, def: &MonitorDef) -> Cadence {
        self.start(def)
    }

    /// A monitor's definition was updated
    ///
    /// Only a changed url or interval reschedules; returns whether a trigger
    /// is running for the monitor afterwards because of this call.
    pub async fn on_monitor_updated(
        &self,
        monitor_id: &str,
        changes: &MonitorChanges,
    ) -> StoreResult<bool> {
        if !changes.requires_reschedule() {
            trace!(monitor_id, "name-only change, trigger left as is");
            return Ok(false);
        }

        Ok(self.restart(monitor_id).await?.is_some())
    }

    /// A monitor was deleted
    pub fn on_monitor_deleted(&self, monitor_id: &str) -> bool {
        self.stop(monitor_id)
    }

    /// The process just started
    pub async fn on_process_start(&self) -> StoreResult<usize> {
        BootReconciler::reconcile(self.store().as_ref(), self).await
    }
}
