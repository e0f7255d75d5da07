//! State shared by all API handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::scheduler::SchedulerRegistry;
use crate::storage::MonitorStore;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Monitor definitions and check results
    pub store: Arc<dyn MonitorStore>,

    /// Notified after every definition change so triggers follow the store
    pub scheduler: Arc<SchedulerRegistry>,

    started_at: Instant,
}

impl ApiState {
    pub fn new(store: Arc<dyn MonitorStore>, scheduler: Arc<SchedulerRegistry>) -> Self {
        Self {
            store,
            scheduler,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
