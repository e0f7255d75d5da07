//! Integration tests for end-to-end health checks
//!
//! These tests verify that:
//! - Real HTTP probes feed the store through the scheduler
//! - Status codes are classified at the 400 boundary
//! - Failures increment the counter and a success resets it

use assert_matches::assert_matches;
use pulsewatch::monitor::{CheckStatus, MonitorDef, MonitorStatus};
use pulsewatch::scheduler::TickOutcome;
use pulsewatch::storage::MonitorStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_up_then_down_then_up() {
    let mock_server = MockServer::start().await;
    let def = MonitorDef::new(
        "owner-1",
        "Mock API",
        format!("{}/health", mock_server.uri()),
        30,
    );
    let (store, registry) = setup(&[def.clone()], http_probe()).await;
    registry.start(&def);

    let _healthy = Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount_as_scoped(&mock_server)
        .await;
    let outcome = registry.check_now(&def.monitor_id).await;
    assert_matches!(outcome, Some(TickOutcome::Completed(result)) if result.status == CheckStatus::Up);
    drop(_healthy);

    let _failing = Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount_as_scoped(&mock_server)
        .await;
    registry.check_now(&def.monitor_id).await;
    registry.check_now(&def.monitor_id).await;

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Down);
    assert_eq!(stored.consecutive_fails, 2);
    drop(_failing);

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    registry.check_now(&def.monitor_id).await;

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Up);
    assert_eq!(stored.consecutive_fails, 0);
    assert_eq!(stored.history.len(), 4);
    let statuses: Vec<CheckStatus> = stored.history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            CheckStatus::Up,
            CheckStatus::Down,
            CheckStatus::Down,
            CheckStatus::Up
        ]
    );
}

#[tokio::test]
async fn test_unreachable_target_records_message() {
    let def = MonitorDef::new("owner-1", "Nothing", "http://127.0.0.1:1/", 30);
    let (store, registry) = setup(&[def.clone()], http_probe()).await;
    registry.start(&def);

    registry.check_now(&def.monitor_id).await;

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Down);
    assert_eq!(stored.consecutive_fails, 1);
    let entry = &stored.history[0];
    assert!(entry.message.is_some());
    assert!(entry.response_time_ms.is_none());
}

#[tokio::test]
async fn test_client_error_counts_as_down() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let def = MonitorDef::new("owner-1", "Missing", mock_server.uri(), 60);
    let (store, registry) = setup(&[def.clone()], http_probe()).await;
    registry.start(&def);
    registry.check_now(&def.monitor_id).await;

    let stored = store.get_by_id(&def.monitor_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Down);
    // the target answered, so its timing is recorded
    assert!(stored.history[0].response_time_ms.is_some());
}
