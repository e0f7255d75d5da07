//! Integration tests for storage persistence
//!
//! These tests verify that:
//! - Monitors and telemetry survive reopening the database
//! - Boot reconciliation works from a reopened SQLite store
//! - Tick writes and definition updates do not clobber each other

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;
use pulsewatch::monitor::{CheckResult, CheckStatus, MonitorChanges, MonitorStatus};
use pulsewatch::scheduler::{Cadence, SchedulerRegistry};
use pulsewatch::storage::MonitorStore;
use pulsewatch::storage::sqlite::SqliteStore;
use tempfile::tempdir;

use crate::helpers::*;

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("monitors.db");
    let def = test_monitor(300);

    {
        let store = SqliteStore::new(&db_path).await.unwrap();
        store.insert_monitor(&def).await.unwrap();
        store
            .apply_check_result(&def.monitor_id, &CheckResult::failed("timeout"), Utc::now())
            .await
            .unwrap();
        store
            .apply_check_result(&def.monitor_id, &CheckResult::failed("timeout"), Utc::now())
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let store = SqliteStore::new(&db_path).await.unwrap();
    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();

    assert_eq!(stored.name, def.name);
    assert_eq!(stored.interval_secs, 300);
    assert_eq!(stored.status, MonitorStatus::Down);
    assert_eq!(stored.consecutive_fails, 2);
    assert_eq!(stored.history.len(), 2);
    assert_eq!(stored.history[0].message.as_deref(), Some("timeout"));
}

#[tokio::test]
async fn test_reconcile_from_reopened_store() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("monitors.db");
    let monitors = [test_monitor(60), test_monitor(3600)];

    {
        let store = SqliteStore::new(&db_path).await.unwrap();
        for def in &monitors {
            store.insert_monitor(def).await.unwrap();
        }
        store.close().await.unwrap();
    }

    let store: Arc<dyn MonitorStore> = Arc::new(SqliteStore::new(&db_path).await.unwrap());
    let registry = SchedulerRegistry::new(store, CountingProbe::up());

    assert_eq!(registry.on_process_start().await.unwrap(), 2);
    assert_eq!(
        registry.cadence_of(&monitors[0].monitor_id),
        Some(Cadence::Minutes(1))
    );
    assert_eq!(
        registry.cadence_of(&monitors[1].monitor_id),
        Some(Cadence::Hours(1))
    );
    registry.shutdown();
}

#[tokio::test]
async fn test_rename_during_checks_keeps_both_writes() {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(
        SqliteStore::new(temp_dir.path().join("monitors.db"))
            .await
            .unwrap(),
    );
    let def = test_monitor(30);
    store.insert_monitor(&def).await.unwrap();

    let writer = {
        let store = store.clone();
        let id = def.monitor_id.clone();
        tokio::spawn(async move {
            for _ in 0..20 {
                store
                    .apply_check_result(&id, &CheckResult::failed("down"), Utc::now())
                    .await
                    .unwrap();
            }
        })
    };

    let renamed = MonitorChanges {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    store
        .update_definition(&def.monitor_id, &renamed)
        .await
        .unwrap();
    writer.await.unwrap();

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.consecutive_fails, 20);
    assert_eq!(stored.history.len(), 20);
}

#[tokio::test]
async fn test_scheduler_writes_to_sqlite() {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(
        SqliteStore::new(temp_dir.path().join("monitors.db"))
            .await
            .unwrap(),
    );
    let def = test_monitor(30);
    store.insert_monitor(&def).await.unwrap();

    let registry = SchedulerRegistry::new(
        store.clone(),
        CountingProbe::with(CheckResult::responded(CheckStatus::Up, 42)),
    );
    registry.start(&def);
    registry.check_now(&def.monitor_id).await;
    registry.stop(&def.monitor_id);

    // give the stopped trigger a moment; nothing more may be written
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Up);
    assert_eq!(stored.last_response_time_ms, 42);
    assert_eq!(stored.history.len(), 1);
}
