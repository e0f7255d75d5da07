//! Rebuilding the trigger table after a process restart

use tracing::{info, instrument, warn};

use super::registry::SchedulerRegistry;
use crate::storage::{MonitorStore, StoreResult};

/// Schedules every persisted monitor on boot
///
/// Triggers live only in memory, so without this pass a restarted process
/// would not check anything until monitors were edited again.
pub struct BootReconciler;

impl BootReconciler {
    /// Start a trigger for each stored monitor and return how many were started
    ///
    /// Expected to run once, before the API accepts requests. Running it
    /// again is harmless: existing triggers are replaced, never duplicated.
    #[instrument(skip_all)]
    pub async fn reconcile(
        store: &dyn MonitorStore,
        registry: &SchedulerRegistry,
    ) -> StoreResult<usize> {
        if registry.running_count() > 0 {
            warn!(
                "{} triggers already running before reconciliation",
                registry.running_count()
            );
        }

        let monitors = store.get_all().await?;
        for def in &monitors {
            registry.start(def);
        }

        info!("scheduled {} persisted monitors", monitors.len());
        Ok(monitors.len())
    }
}
