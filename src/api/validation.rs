//! Input rules for monitor definitions

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::error;

const URL_REGEX: &str = r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

/// `None` only if the pattern fails to compile, in which case every url is
/// rejected and the failure is logged once
static URL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| match Regex::new(URL_REGEX) {
    Ok(re) => Some(re),
    Err(e) => {
        error!("url pattern failed to compile, rejecting all urls: {e}");
        None
    }
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NameRequired,
    InvalidUrl,
    IntervalRequired,
    IntervalNotANumber,
    IntervalNotAllowed(&'static [u64]),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NameRequired => f.write_str("API name is required"),
            ValidationError::InvalidUrl => f.write_str("Invalid url format"),
            ValidationError::IntervalRequired => f.write_str("Interval is required"),
            ValidationError::IntervalNotANumber => {
                f.write_str("Interval must be a number in seconds")
            }
            ValidationError::IntervalNotAllowed(allowed) => {
                let list = allowed
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Interval must be one of: {list} seconds")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn is_valid_url(url: &str) -> bool {
    URL_PATTERN.as_ref().is_some_and(|re| re.is_match(url))
}

/// Trimmed, non-empty monitor name
pub fn require_name(name: Option<&str>) -> Result<String, ValidationError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ValidationError::NameRequired),
    }
}

/// Trimmed http(s) URL
pub fn require_url(url: Option<&str>) -> Result<String, ValidationError> {
    let url = url.map(str::trim).unwrap_or_default();
    if is_valid_url(url) {
        Ok(url.to_string())
    } else {
        Err(ValidationError::InvalidUrl)
    }
}

/// Interval for a new monitor; zero, empty and null count as missing
pub fn require_interval(
    interval: Option<&Value>,
    allowed: &'static [u64],
) -> Result<u64, ValidationError> {
    match interval {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            Err(ValidationError::IntervalRequired)
        }
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::IntervalRequired),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            Err(ValidationError::IntervalRequired)
        }
        Some(value) => parse_interval(value, allowed),
    }
}

/// Interval given as a JSON number or numeric string, checked against `allowed`
pub fn parse_interval(value: &Value, allowed: &'static [u64]) -> Result<u64, ValidationError> {
    let seconds = match value {
        Value::Number(n) => n.as_f64().ok_or(ValidationError::IntervalNotANumber)?,
        Value::String(s) => match s.trim() {
            "" => 0.0,
            text => text
                .parse::<f64>()
                .map_err(|_| ValidationError::IntervalNotANumber)?,
        },
        Value::Null => 0.0,
        _ => return Err(ValidationError::IntervalNotANumber),
    };

    if !seconds.is_finite() {
        return Err(ValidationError::IntervalNotANumber);
    }

    allowed
        .iter()
        .copied()
        .find(|&candidate| candidate as f64 == seconds)
        .ok_or(ValidationError::IntervalNotAllowed(allowed))
}
