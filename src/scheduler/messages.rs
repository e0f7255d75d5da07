//! Message types exchanged with trigger actors

use tokio::sync::oneshot;

use crate::monitor::CheckResult;

/// Commands that can be sent to a trigger actor
#[derive(Debug)]
pub enum TriggerCommand {
    /// Run one tick now, outside the cadence
    ///
    /// Goes through the same in-flight guard as timer firings.
    CheckNow {
        respond_to: oneshot::Sender<TickOutcome>,
    },

    /// Stop firing; ticks already running are left to finish
    Shutdown,
}

/// What happened to one firing of a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Probe ran and its result was persisted
    Completed(CheckResult),

    /// Another tick for the same monitor was still running
    Skipped,

    /// The trigger was stopped before this tick began
    Cancelled,

    /// The monitor no longer exists in the store
    Vanished,

    /// The result could not be persisted
    Failed(String),
}

impl TickOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TickOutcome::Completed(_))
    }
}
