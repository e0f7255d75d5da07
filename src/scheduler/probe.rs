//! Single bounded HTTP check of a monitor's URL
//!
//! A probe never fails: every transport error is folded into a Down
//! classification with a message. There are no retries here; the next tick
//! is the retry.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{instrument, trace, warn};

use crate::monitor::{CheckResult, CheckStatus};

/// Executes one network check and classifies it
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str) -> CheckResult;
}

/// GET-based probe backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// HTTP client (reused across requests for efficiency)
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Classify a completed response
    pub fn classify(status_code: u16) -> CheckStatus {
        if status_code >= 400 {
            CheckStatus::Down
        } else {
            CheckStatus::Up
        }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    #[instrument(skip(self))]
    async fn probe(&self, url: &str) -> CheckResult {
        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_millis() as u64;
                let status_code = response.status().as_u16();
                trace!("{url}: HTTP {status_code} in {elapsed}ms");
                CheckResult::responded(Self::classify(status_code), elapsed)
            }
            Err(e) => {
                let message = describe_error(&e);
                warn!("{url}: request failed: {message}");
                CheckResult::failed(message)
            }
        }
    }
}

/// Flatten an error and its sources into one line
fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    if message.is_empty() {
        message.push_str("request failed");
    }
    message
}
