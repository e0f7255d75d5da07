//! Monitor scheduling and health checks
//!
//! Every registered monitor gets a periodic trigger. Each firing probes the
//! monitor's URL and writes the classified result back to the store.
//!
//! ## Components
//!
//! - **cadence**: maps a monitor interval to a firing cadence
//! - **probe**: one bounded HTTP check, classified Up or Down
//! - **trigger**: per-monitor actor that fires ticks on its cadence
//! - **registry**: process-wide table of running triggers
//! - **lifecycle**: hooks for monitor create/update/delete and process start
//! - **reconcile**: reschedules all persisted monitors on boot
//!
//! ## Guarantees
//!
//! - At most one trigger per monitor id
//! - At most one tick per monitor in flight; overlapping firings are dropped
//! - No new tick begins after `stop` returns
//! - Check results are applied to the store in one atomic write

pub mod cadence;
pub mod lifecycle;
pub mod messages;
pub mod probe;
pub mod reconcile;
pub mod registry;
pub mod trigger;

pub use cadence::{Cadence, Translator, translate};
pub use messages::{TickOutcome, TriggerCommand};
pub use probe::{HealthProbe, HttpProbe};
pub use reconcile::BootReconciler;
pub use registry::SchedulerRegistry;
pub use trigger::{ScheduledTask, TickAction, TriggerHandle};
