//! Process-wide table of running triggers

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use super::cadence::{self, Cadence, Translator};
use super::messages::TickOutcome;
use super::probe::HealthProbe;
use super::trigger::{ScheduledTask, TickAction};
use crate::monitor::MonitorDef;
use crate::storage::{MonitorStore, StoreResult};

#[derive(Default)]
struct RegistryState {
    /// At most one live trigger per monitor id
    tasks: HashMap<String, ScheduledTask>,

    /// In-flight flags outlive individual triggers so that a tick started
    /// before a restart still blocks ticks of the replacement trigger.
    ///
    /// A flag is freed once its last trigger and tick are gone; the dead
    /// entry itself is pruned by the next `start`, `stop` or `shutdown`.
    in_flight: HashMap<String, Weak<AtomicBool>>,

    /// Serializes restarts of one monitor across the store read and `start`
    restarts: HashMap<String, Arc<AsyncMutex<()>>>,
}

impl RegistryState {
    fn prune_flags(&mut self) {
        self.in_flight.retain(|_, flag| flag.strong_count() > 0);
    }

    /// The live flag for `monitor_id`, shared with any tick still running
    fn in_flight_flag(&mut self, monitor_id: &str) -> Arc<AtomicBool> {
        if let Some(flag) = self.in_flight.get(monitor_id).and_then(Weak::upgrade) {
            return flag;
        }
        let flag = Arc::new(AtomicBool::new(false));
        self.in_flight
            .insert(monitor_id.to_string(), Arc::downgrade(&flag));
        flag
    }
}

/// Owns every scheduled trigger in the process
///
/// All operations are safe to call from any task. `start` and `stop` are
/// synchronous and never wait on a running tick.
pub struct SchedulerRegistry {
    store: Arc<dyn MonitorStore>,
    probe: Arc<dyn HealthProbe>,
    translate: Translator,
    state: Mutex<RegistryState>,
}

impl SchedulerRegistry {
    pub fn new(store: Arc<dyn MonitorStore>, probe: Arc<dyn HealthProbe>) -> Self {
        Self::with_translator(store, probe, cadence::translate)
    }

    /// Use a custom interval to cadence mapping
    pub fn with_translator(
        store: Arc<dyn MonitorStore>,
        probe: Arc<dyn HealthProbe>,
        translate: Translator,
    ) -> Self {
        Self {
            store,
            probe,
            translate,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn MonitorStore> {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Nothing panics while holding the lock, but a poisoned map is
        // still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule periodic checks for `def`
    ///
    /// A trigger already registered under the same id is stopped and
    /// replaced, so the registry never holds two triggers for one monitor.
    #[instrument(skip(self, def), fields(monitor_id = %def.monitor_id))]
    pub fn start(&self, def: &MonitorDef) -> Cadence {
        let cadence = (self.translate)(def.interval_secs);
        let mut state = self.lock();

        if let Some(previous) = state.tasks.remove(&def.monitor_id) {
            warn!("trigger already running, replacing it");
            previous.stop();
        }

        state.prune_flags();
        let in_flight = state.in_flight_flag(&def.monitor_id);
        let action = TickAction::new(
            def.monitor_id.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.probe),
            in_flight,
        );

        state
            .tasks
            .insert(def.monitor_id.clone(), ScheduledTask::spawn(action, cadence));

        info!("scheduled '{}' ({}) {cadence}", def.name, def.url);
        cadence
    }

    /// Stop the trigger for `monitor_id`
    ///
    /// Returns false when nothing was scheduled. No tick of the stopped
    /// trigger begins after this returns.
    #[instrument(skip(self))]
    pub fn stop(&self, monitor_id: &str) -> bool {
        let mut state = self.lock();
        let removed = state.tasks.remove(monitor_id);
        state.prune_flags();

        match removed {
            Some(task) => {
                task.stop();
                info!("stopped trigger");
                true
            }
            None => {
                debug!("no trigger running");
                false
            }
        }
    }

    /// Replace the trigger with one built from the current stored definition
    ///
    /// If the monitor no longer exists the old trigger is still torn down
    /// and nothing new is started; `Ok(None)` is returned.
    ///
    /// Concurrent restarts of the same monitor run one after another, so the
    /// last one to finish always starts from the newest definition.
    #[instrument(skip(self))]
    pub async fn restart(&self, monitor_id: &str) -> StoreResult<Option<Cadence>> {
        let gate = Arc::clone(
            self.lock()
                .restarts
                .entry(monitor_id.to_string())
                .or_default(),
        );

        let result = {
            let _serial = gate.lock().await;
            self.restart_from_store(monitor_id).await
        };

        drop(gate);
        let mut state = self.lock();
        if state
            .restarts
            .get(monitor_id)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            state.restarts.remove(monitor_id);
        }

        result
    }

    async fn restart_from_store(&self, monitor_id: &str) -> StoreResult<Option<Cadence>> {
        match self.store.get_by_id(monitor_id).await? {
            Some(def) => Ok(Some(self.start(&def))),
            None => {
                debug!("monitor no longer exists, not rescheduling");
                self.stop(monitor_id);
                Ok(None)
            }
        }
    }

    /// Fire a tick immediately and wait for its outcome
    ///
    /// Returns `None` when the monitor has no running trigger.
    pub async fn check_now(&self, monitor_id: &str) -> Option<TickOutcome> {
        let handle = self
            .lock()
            .tasks
            .get(monitor_id)
            .map(|task| task.handle().clone())?;

        match handle.check_now().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                debug!(monitor_id, "check request not served: {e:#}");
                Some(TickOutcome::Cancelled)
            }
        }
    }

    pub fn is_running(&self, monitor_id: &str) -> bool {
        self.lock().tasks.contains_key(monitor_id)
    }

    pub fn cadence_of(&self, monitor_id: &str) -> Option<Cadence> {
        self.lock()
            .tasks
            .get(monitor_id)
            .map(|task| task.handle().cadence())
    }

    pub fn running_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn monitor_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().tasks.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stop every trigger
    pub fn shutdown(&self) {
        let mut state = self.lock();
        let count = state.tasks.len();
        for (_, task) in state.tasks.drain() {
            task.stop();
        }
        state.prune_flags();
        info!("stopped {count} triggers");
    }
}
