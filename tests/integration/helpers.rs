//! Helper functions for integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pulsewatch::monitor::{CheckResult, CheckStatus, MonitorDef};
use pulsewatch::scheduler::{HealthProbe, HttpProbe, SchedulerRegistry};
use pulsewatch::storage::{MemoryStore, MonitorStore};

/// Probe that always answers the same way and counts its calls
pub struct CountingProbe {
    result: CheckResult,
    calls: AtomicUsize,
}

impl CountingProbe {
    pub fn up() -> Arc<Self> {
        Self::with(CheckResult::responded(CheckStatus::Up, 7))
    }

    pub fn down() -> Arc<Self> {
        Self::with(CheckResult::failed("connection refused"))
    }

    pub fn with(result: CheckResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for CountingProbe {
    async fn probe(&self, _url: &str) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn test_monitor(interval_secs: u64) -> MonitorDef {
    MonitorDef::new("owner-1", "Test API", "https://api.example.com/health", interval_secs)
}

pub fn http_probe() -> Arc<HttpProbe> {
    Arc::new(HttpProbe::new(Duration::from_secs(2)).unwrap())
}

/// Memory store seeded with `monitors` and a registry on top of it
pub async fn setup(
    monitors: &[MonitorDef],
    probe: Arc<dyn HealthProbe>,
) -> (Arc<MemoryStore>, Arc<SchedulerRegistry>) {
    let store = Arc::new(MemoryStore::new());
    for def in monitors {
        store.insert_monitor(def).await.unwrap();
    }
    let registry = Arc::new(SchedulerRegistry::new(store.clone(), probe));
    (store, registry)
}

/// Let spawned tasks run to their next await point
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused time by whole periods, letting ticks run after each one
pub async fn advance(period: Duration, times: usize) {
    for _ in 0..times {
        tokio::time::sleep(period).await;
        settle().await;
    }
}
