//! Periodic trigger for a single monitor
//!
//! Each scheduled monitor gets one trigger actor. The actor owns a ticker
//! configured from the monitor's [`Cadence`] and spawns one tick task per
//! firing, so a slow target never blocks the ticker or any other monitor.
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → spawn tick → [guard] → load monitor → probe URL → apply result to store
//!     ↑
//!     └─── Commands (CheckNow, Shutdown)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, debug, error, instrument, trace, warn};

use super::cadence::Cadence;
use super::messages::{TickOutcome, TriggerCommand};
use super::probe::HealthProbe;
use crate::storage::{MonitorStore, StoreError};

/// Holds a monitor's in-flight flag for the duration of one tick
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The work performed on every firing of a trigger
///
/// Carries no state between ticks apart from the shared flags: the monitor
/// is re-read from the store each time, so url and counters are always the
/// persisted ones.
pub struct TickAction {
    monitor_id: String,
    store: Arc<dyn MonitorStore>,
    probe: Arc<dyn HealthProbe>,

    /// Shared by every trigger ever created for this monitor id
    in_flight: Arc<AtomicBool>,

    /// Set once the owning trigger is stopped
    stopped: Arc<AtomicBool>,
}

impl TickAction {
    pub fn new(
        monitor_id: String,
        store: Arc<dyn MonitorStore>,
        probe: Arc<dyn HealthProbe>,
        in_flight: Arc<AtomicBool>,
    ) -> Self {
        Self {
            monitor_id,
            store,
            probe,
            in_flight,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn monitor_id(&self) -> &str {
        &self.monitor_id
    }

    /// Run one tick
    ///
    /// Never returns an error: every failure is logged and reported through
    /// the returned [`TickOutcome`].
    #[instrument(skip(self), fields(monitor_id = %self.monitor_id))]
    pub async fn run(&self) -> TickOutcome {
        if self.stopped.load(Ordering::SeqCst) {
            trace!("trigger stopped, not starting tick");
            return TickOutcome::Cancelled;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("previous tick still running, dropping this one");
            return TickOutcome::Skipped;
        };

        let monitor = match self.store.get_by_id(&self.monitor_id).await {
            Ok(Some(monitor)) => monitor,
            Ok(None) => {
                debug!("monitor no longer exists");
                return TickOutcome::Vanished;
            }
            Err(e) => {
                error!("failed to load monitor: {e}");
                return TickOutcome::Failed(e.to_string());
            }
        };

        trace!("checking {} ({})", monitor.name, monitor.url);
        let result = self.probe.probe(&monitor.url).await;

        match self
            .store
            .apply_check_result(&self.monitor_id, &result, Utc::now())
            .await
        {
            Ok(()) => {
                debug!(
                    status = %result.status,
                    response_time_ms = ?result.response_time_ms,
                    "check recorded"
                );
                TickOutcome::Completed(result)
            }
            Err(StoreError::NotFound(_)) => {
                debug!("monitor deleted while probing, result dropped");
                TickOutcome::Vanished
            }
            Err(e) => {
                error!("failed to persist check result: {e}");
                TickOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Actor that fires a monitor's tick action on its cadence
pub struct TriggerActor {
    action: Arc<TickAction>,
    cadence: Cadence,
    command_rx: mpsc::Receiver<TriggerCommand>,
}

impl TriggerActor {
    pub fn new(
        action: Arc<TickAction>,
        cadence: Cadence,
        command_rx: mpsc::Receiver<TriggerCommand>,
    ) -> Self {
        Self {
            action,
            cadence,
            command_rx,
        }
    }

    /// Run the actor's main loop
    ///
    /// The first firing happens one full period after start. Firings missed
    /// while the runtime was busy are skipped, not replayed. Runs until:
    /// - A Shutdown command is received
    /// - The command channel is closed
    #[instrument(skip(self), fields(monitor_id = %self.action.monitor_id(), cadence = %self.cadence))]
    pub async fn run(mut self) {
        debug!("starting trigger");

        // a zero period would make the ticker panic
        let period = self.cadence.period().max(Duration::from_secs(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.fire(None);
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(TriggerCommand::CheckNow { respond_to }) => {
                            debug!("received CheckNow command");
                            self.fire(Some(respond_to));
                        }

                        Some(TriggerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("trigger stopped");
    }

    /// Spawn one tick without waiting for it
    fn fire(&self, respond_to: Option<oneshot::Sender<TickOutcome>>) {
        let action = Arc::clone(&self.action);
        tokio::spawn(
            async move {
                let outcome = action.run().await;
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(outcome);
                }
            }
            .in_current_span(),
        );
    }
}

/// Cloneable handle for talking to a running trigger
#[derive(Clone)]
pub struct TriggerHandle {
    sender: mpsc::Sender<TriggerCommand>,
    stopped: Arc<AtomicBool>,
    cadence: Cadence,
}

impl TriggerHandle {
    /// Run a tick now and wait for its outcome
    pub async fn check_now(&self) -> Result<TickOutcome> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TriggerCommand::CheckNow { respond_to: tx })
            .await
            .context("trigger is no longer running")?;

        rx.await.context("tick was dropped before completing")
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// A live trigger owned by the registry
pub struct ScheduledTask {
    handle: TriggerHandle,
    task: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn the trigger actor for `action`
    pub fn spawn(action: TickAction, cadence: Cadence) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let stopped = Arc::clone(&action.stopped);

        let actor = TriggerActor::new(Arc::new(action), cadence, cmd_rx);
        let task = tokio::spawn(actor.run());

        Self {
            handle: TriggerHandle {
                sender: cmd_tx,
                stopped,
                cadence,
            },
            task,
        }
    }

    pub fn handle(&self) -> &TriggerHandle {
        &self.handle
    }

    /// Stop firing
    ///
    /// Once this returns no new tick begins. A tick that already passed its
    /// start check runs to completion and still writes its result.
    pub fn stop(self) {
        self.handle.stopped.store(true, Ordering::SeqCst);
        if self.handle.sender.try_send(TriggerCommand::Shutdown).is_err() {
            self.task.abort();
        }
    }
}
