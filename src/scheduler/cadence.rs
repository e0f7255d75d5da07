//! Check interval to trigger cadence mapping

use std::fmt;
use std::time::Duration;

/// How often a monitor's trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
}

impl Cadence {
    /// Time between two firings
    pub fn period(&self) -> Duration {
        match *self {
            Cadence::Seconds(n) => Duration::from_secs(n),
            Cadence::Minutes(n) => Duration::from_secs(n * 60),
            Cadence::Hours(n) => Duration::from_secs(n * 3600),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, unit) = match *self {
            Cadence::Seconds(n) => (n, "second"),
            Cadence::Minutes(n) => (n, "minute"),
            Cadence::Hours(n) => (n, "hour"),
        };
        if n == 1 {
            write!(f, "every 1 {unit}")
        } else {
            write!(f, "every {n} {unit}s")
        }
    }
}

/// Signature of the interval translator injected into the registry
pub type Translator = fn(u64) -> Cadence;

/// Translate a check interval into a trigger cadence
///
/// Known intervals map exactly. Anything else is rounded down to whole
/// minutes with a floor of one minute, so unlisted sub-minute precision is
/// lost.
pub fn translate(interval_secs: u64) -> Cadence {
    match interval_secs {
        30 => Cadence::Seconds(30),
        60 => Cadence::Minutes(1),
        300 => Cadence::Minutes(5),
        600 => Cadence::Minutes(10),
        900 => Cadence::Minutes(15),
        1800 => Cadence::Minutes(30),
        2700 => Cadence::Minutes(45),
        3600 => Cadence::Hours(1),
        7200 => Cadence::Hours(2),
        other => Cadence::Minutes((other / 60).max(1)),
    }
}
