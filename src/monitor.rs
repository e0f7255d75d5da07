//! Monitor definitions and check history
//!
//! A [`MonitorDef`] is the persisted description of one registered URL together
//! with the telemetry the scheduler writes after every tick. Two actors mutate
//! it: the CRUD layer (name, url, interval) and the tick action (status,
//! timestamps, counters, history). Keep those field sets disjoint.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Maximum number of history entries kept per monitor
pub const HISTORY_LIMIT: usize = 100;

/// Length of generated monitor identifiers
pub const MONITOR_ID_LEN: usize = 16;

/// Intervals (seconds) accepted when a monitor is created
pub const CREATE_INTERVALS: [u64; 6] = [30, 60, 300, 600, 1800, 3600];

/// Intervals (seconds) accepted when a monitor is updated
///
/// Differs from [`CREATE_INTERVALS`] by the two hour cadence.
pub const UPDATE_INTERVALS: [u64; 7] = [30, 60, 300, 600, 1800, 3600, 7200];

/// Overall status of a monitor as shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum MonitorStatus {
    /// Never checked yet
    #[default]
    Unknown,
    Up,
    Down,
}

/// Classification of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum CheckStatus {
    Up,
    Down,
}

impl MonitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorStatus::Unknown => "Unknown",
            MonitorStatus::Up => "Up",
            MonitorStatus::Down => "Down",
        }
    }
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Up => "Up",
            CheckStatus::Down => "Down",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CheckStatus> for MonitorStatus {
    fn from(value: CheckStatus) -> Self {
        match value {
            CheckStatus::Up => MonitorStatus::Up,
            CheckStatus::Down => MonitorStatus::Down,
        }
    }
}

/// Error returned when a persisted status string is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown monitor status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for MonitorStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(MonitorStatus::Unknown),
            "Up" => Ok(MonitorStatus::Up),
            "Down" => Ok(MonitorStatus::Down),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for CheckStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Up" => Ok(CheckStatus::Up),
            "Down" => Ok(CheckStatus::Down),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Outcome of one probe, and the input of a store update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub status: CheckStatus,

    /// Set whenever the request completed, regardless of the status code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    /// Failure description, only for requests that did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    /// A completed request
    pub fn responded(status: CheckStatus, response_time_ms: u64) -> Self {
        Self {
            status,
            response_time_ms: Some(response_time_ms),
            message: None,
        }
    }

    /// A request that failed before any response arrived
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Down,
            response_time_ms: None,
            message: Some(message.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }
}

/// One entry of a monitor's bounded check log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub status: CheckStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl HistoryEntry {
    pub fn from_check(result: &CheckResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: result.status,
            timestamp,
            message: result.message.clone(),
            response_time_ms: result.response_time_ms,
        }
    }
}

/// A registered monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MonitorDef {
    pub monitor_id: String,
    pub owner_id: String,
    pub name: String,
    pub url: String,

    /// Check interval in seconds
    #[serde(rename = "interval")]
    pub interval_secs: u64,

    pub status: MonitorStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub last_response_time_ms: u64,
    pub consecutive_fails: u32,

    /// Oldest first, at most [`HISTORY_LIMIT`] entries
    pub history: Vec<HistoryEntry>,
}

impl MonitorDef {
    /// Create a fresh, never checked monitor with a generated id
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        interval_secs: u64,
    ) -> Self {
        Self {
            monitor_id: generate_monitor_id(),
            owner_id: owner_id.into(),
            name: name.into(),
            url: url.into(),
            interval_secs,
            status: MonitorStatus::Unknown,
            last_checked_at: None,
            last_response_time_ms: 0,
            consecutive_fails: 0,
            history: Vec::new(),
        }
    }

    /// Apply the telemetry part of a check result
    ///
    /// Sets status and timestamps, advances or resets the failure counter and
    /// appends one history entry, evicting the oldest ones beyond
    /// [`HISTORY_LIMIT`].
    pub fn record_check(&mut self, result: &CheckResult, at: DateTime<Utc>) {
        self.status = result.status.into();
        self.last_checked_at = Some(at);
        if let Some(elapsed) = result.response_time_ms {
            self.last_response_time_ms = elapsed;
        }
        self.consecutive_fails = next_consecutive_fails(self.consecutive_fails, result.status);

        self.history.push(HistoryEntry::from_check(result, at));
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

/// Definition fields changed by the CRUD layer
///
/// Only fields that actually differ from the stored definition are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorChanges {
    pub name: Option<String>,
    pub url: Option<String>,
    pub interval_secs: Option<u64>,
}

impl MonitorChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.interval_secs.is_none()
    }

    /// A new target or cadence invalidates the running trigger
    pub fn requires_reschedule(&self) -> bool {
        self.url.is_some() || self.interval_secs.is_some()
    }
}

impl MonitorDef {
    /// Apply definition changes, leaving telemetry fields untouched
    pub fn apply_changes(&mut self, changes: &MonitorChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(url) = &changes.url {
            self.url = url.clone();
        }
        if let Some(interval_secs) = changes.interval_secs {
            self.interval_secs = interval_secs;
        }
    }
}

/// Failure counter after a check with the given classification
pub fn next_consecutive_fails(previous: u32, status: CheckStatus) -> u32 {
    match status {
        CheckStatus::Up => 0,
        CheckStatus::Down => previous.saturating_add(1),
    }
}

/// Generate a random alphanumeric monitor identifier
pub fn generate_monitor_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(MONITOR_ID_LEN)
        .map(char::from)
        .collect()
}
