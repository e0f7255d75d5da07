pub mod config;
pub mod monitor;
pub mod scheduler;
pub mod storage;
pub mod util;

#[cfg(feature = "api")]
pub mod api;

pub use monitor::{
    CheckResult, CheckStatus, HistoryEntry, MonitorChanges, MonitorDef, MonitorStatus,
};
