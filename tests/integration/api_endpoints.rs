//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - Monitor CRUD endpoints return the documented bodies
//! - Validation errors use the shared error envelope
//! - Every write is reflected in the scheduler
//! - Unknown routes and missing owner identity are rejected

use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use pulsewatch::api::{ApiConfig, ApiState, OWNER_HEADER, spawn_api_server};
use pulsewatch::scheduler::{Cadence, SchedulerRegistry};
use pulsewatch::storage::{MemoryStore, MonitorStore};
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::helpers::*;

struct TestApi {
    addr: SocketAddr,
    client: reqwest::Client,
    store: Arc<MemoryStore>,
    registry: Arc<SchedulerRegistry>,
}

impl TestApi {
    async fn spawn() -> Self {
        let (store, registry) = setup(&[], CountingProbe::up()).await;
        let state = ApiState::new(store.clone(), registry.clone());

        let config = ApiConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
            enable_cors: true,
            dashboard_dir: None,
        };
        let addr = spawn_api_server(config, state).await.unwrap();

        Self {
            addr,
            client: reqwest::Client::new(),
            store,
            registry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn create(&self, owner: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/api/v1/monitors/new"))
            .header(OWNER_HEADER, owner)
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status(), response.json().await.unwrap())
    }

    async fn patch(&self, owner: &str, id: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .patch(self.url(&format!("/api/v1/monitors/{id}")))
            .header(OWNER_HEADER, owner)
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status(), response.json().await.unwrap())
    }

    async fn delete(&self, owner: &str, id: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(self.url(&format!("/api/v1/monitors/{id}")))
            .header(OWNER_HEADER, owner)
            .send()
            .await
            .unwrap();
        (response.status(), response.json().await.unwrap())
    }

    async fn list(&self, owner: &str) -> Value {
        self.client
            .get(self.url("/api/v1/monitors/get"))
            .header(OWNER_HEADER, owner)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

fn valid_body() -> Value {
    json!({"name": "My API", "url": "https://api.example.com/health", "interval": 60})
}

#[tokio::test]
async fn test_health_endpoint() {
    let api = TestApi::spawn().await;

    let response = api
        .client
        .get(api.url("/api/admin/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_create_monitor_schedules_it() {
    let api = TestApi::spawn().await;

    let (status, body) = api.create("owner-1", valid_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["status"], "Created");
    assert_eq!(body["message"], "Monitor created successfully");
    assert_eq!(body["monitor"]["name"], "My API");
    assert_eq!(body["monitor"]["interval"], 60);
    assert_eq!(body["monitor"]["status"], "Unknown");

    let id = body["monitor"]["monitorId"].as_str().unwrap();
    assert_eq!(id.len(), 16);
    assert_eq!(api.registry.cadence_of(id), Some(Cadence::Minutes(1)));
    assert!(api.store.get_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_accepts_numeric_string_interval() {
    let api = TestApi::spawn().await;

    let (status, body) = api
        .create(
            "owner-1",
            json!({"name": "API", "url": "  https://example.com/x ", "interval": "300"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["monitor"]["interval"], 300);
    assert_eq!(body["monitor"]["url"], "https://example.com/x");
}

#[tokio::test]
async fn test_create_validation_messages() {
    let api = TestApi::spawn().await;

    let cases = [
        (
            json!({"url": "https://example.com", "interval": 60}),
            "API name is required",
        ),
        (
            json!({"name": "API", "url": "example.com", "interval": 60}),
            "Invalid url format",
        ),
        (
            json!({"name": "API", "url": "https://example.com"}),
            "Interval is required",
        ),
        (
            json!({"name": "API", "url": "https://example.com", "interval": "often"}),
            "Interval must be a number in seconds",
        ),
        (
            json!({"name": "API", "url": "https://example.com", "interval": 7200}),
            "Interval must be one of: 30, 60, 300, 600, 1800, 3600 seconds",
        ),
    ];

    for (body, message) in cases {
        let (status, response) = api.create("owner-1", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response,
            json!({"code": 400, "status": "Bad Request", "message": message})
        );
    }

    assert_eq!(api.registry.running_count(), 0);
}

#[tokio::test]
async fn test_list_is_scoped_to_owner() {
    let api = TestApi::spawn().await;
    api.create("owner-1", valid_body()).await;
    api.create("owner-1", valid_body()).await;
    api.create("owner-2", valid_body()).await;

    let body = api.list("owner-1").await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["status"], "Success");
    assert_eq!(body["monitors"].as_array().unwrap().len(), 2);
    assert_eq!(body["monitors"][0]["consecutiveFails"], 0);
    assert!(body["monitors"][0]["history"].is_array());

    let empty = api.list("owner-3").await;
    assert_eq!(empty["monitors"], json!([]));
}

#[tokio::test]
async fn test_update_reports_only_changes_and_reschedules() {
    let api = TestApi::spawn().await;
    let (_, created) = api.create("owner-1", valid_body()).await;
    let id = created["monitor"]["monitorId"].as_str().unwrap().to_string();

    let (status, body) = api
        .patch(
            "owner-1",
            &id,
            json!({"name": "My API", "url": "https://api.example.com/health", "interval": 7200}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monitor updated successfully");
    assert_eq!(body["monitor"], json!({"monitorId": id, "interval": 7200}));
    assert_eq!(api.registry.cadence_of(&id), Some(Cadence::Hours(2)));
}

#[tokio::test]
async fn test_rename_keeps_trigger() {
    let api = TestApi::spawn().await;
    let (_, created) = api.create("owner-1", valid_body()).await;
    let id = created["monitor"]["monitorId"].as_str().unwrap().to_string();

    let (status, body) = api.patch("owner-1", &id, json!({"name": "Renamed"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monitor"], json!({"monitorId": id, "name": "Renamed"}));

    let stored = api.store.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(api.registry.cadence_of(&id), Some(Cadence::Minutes(1)));
}

#[tokio::test]
async fn test_update_rejects_invalid_input() {
    let api = TestApi::spawn().await;
    let (_, created) = api.create("owner-1", valid_body()).await;
    let id = created["monitor"]["monitorId"].as_str().unwrap().to_string();

    let (status, body) = api.patch("owner-1", &id, json!({"url": "nope"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid url format");

    let (status, body) = api.patch("owner-1", &id, json!({"interval": 45})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Interval must be one of: 30, 60, 300, 600, 1800, 3600, 7200 seconds"
    );

    let (status, body) = api.patch("owner-1", &id, json!({"interval": null})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Interval must be one of: 30, 60, 300, 600, 1800, 3600, 7200 seconds"
    );
}

#[tokio::test]
async fn test_foreign_monitor_is_not_found() {
    let api = TestApi::spawn().await;
    let (_, created) = api.create("owner-1", valid_body()).await;
    let id = created["monitor"]["monitorId"].as_str().unwrap().to_string();

    let expected = json!({
        "code": 404,
        "status": "Not Found",
        "message": "Monitor not found or unauthorized"
    });

    let (status, body) = api.patch("owner-2", &id, json!({"name": "Mine"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, expected);

    let (status, body) = api.delete("owner-2", &id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, expected);

    assert!(api.registry.is_running(&id));
}

#[tokio::test]
async fn test_delete_stops_trigger() {
    let api = TestApi::spawn().await;
    let (_, created) = api.create("owner-1", valid_body()).await;
    let id = created["monitor"]["monitorId"].as_str().unwrap().to_string();

    let (status, body) = api.delete("owner-1", &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"code": 200, "status": "Success", "message": "Monitor deleted successfully"})
    );
    assert!(!api.registry.is_running(&id));
    assert!(api.store.get_by_id(&id).await.unwrap().is_none());

    let (status, _) = api.delete("owner-1", &id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_owner_is_unauthorized() {
    let api = TestApi::spawn().await;

    let response = api
        .client
        .get(api.url("/api/v1/monitors/get"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let api = TestApi::spawn().await;

    let response = api
        .client
        .get(api.url("/api/v1/nothing-here"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "This endpoint doesn't exist, Visit /api/docs for API documentation."
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let api = TestApi::spawn().await;

    let response = api
        .client
        .get(api.url("/api/docs/openapi.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc: Value = response.json().await.unwrap();
    assert!(doc["paths"]["/api/v1/monitors/new"].is_object());
}
