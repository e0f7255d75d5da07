//! REST API for managing monitors
//!
//! This module is the CRUD side of the scheduler: every successful write to
//! the store is followed by the matching lifecycle hook on the
//! [`SchedulerRegistry`](crate::scheduler::SchedulerRegistry).
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **Owner identity** from the `X-Owner-Id` header set by the fronting layer
//! - **OpenAPI** documentation via utoipa, Swagger UI at `/api/docs`
//!
//! ## Endpoints
//!
//! - `GET /api/admin/health` - Health check
//! - `POST /api/v1/monitors/new` - Create a monitor
//! - `GET /api/v1/monitors/get` - List the caller's monitors
//! - `PATCH /api/v1/monitors/{monitorId}` - Update a monitor
//! - `DELETE /api/v1/monitors/{monitorId}` - Delete a monitor

pub mod docs;
pub mod error;
pub mod owner;
pub mod routes;
pub mod state;
pub mod types;
pub mod validation;

pub use error::{ApiError, ApiResult};
pub use owner::{OWNER_HEADER, OwnerId};
pub use state::ApiState;
pub use types::{
    ApiMessage, ChangedFields, CreateMonitorRequest, CreateMonitorResponse, HealthResponse,
    MonitorListResponse, MonitorSummary, UpdateMonitorRequest, UpdateMonitorResponse,
};

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, patch, post},
};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ApiSettings;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8000")
    pub bind_addr: SocketAddr,

    /// Enable CORS for the dashboard
    pub enable_cors: bool,

    /// Static frontend served for unmatched paths
    pub dashboard_dir: Option<PathBuf>,
}

impl ApiConfig {
    pub fn new(bind_addr: SocketAddr, settings: &ApiSettings) -> Self {
        Self {
            bind_addr,
            enable_cors: settings.enable_cors,
            dashboard_dir: settings.dashboard_dir.clone(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(crate::util::DEFAULT_HOST, crate::util::DEFAULT_PORT),
            enable_cors: true,
            dashboard_dir: None,
        }
    }
}

/// Build the application router
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let mut app = Router::new()
        .route("/api/admin/health", get(routes::health::health_check))
        .route("/api/v1/monitors/new", post(routes::monitors::create_monitor))
        .route("/api/v1/monitors/get", get(routes::monitors::list_monitors))
        .route(
            "/api/v1/monitors/{monitor_id}",
            patch(routes::monitors::update_monitor).delete(routes::monitors::delete_monitor),
        )
        .method_not_allowed_fallback(routes::not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", docs::ApiDoc::openapi()));

    app = with_fallback(app, config);
    app = app.layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Serve the dashboard for unmatched paths if it exists, the JSON 404 otherwise
#[cfg(feature = "web-dashboard")]
fn with_fallback(app: Router, config: &ApiConfig) -> Router {
    use axum::handler::HandlerWithoutStateExt;
    use tower_http::services::ServeDir;

    match &config.dashboard_dir {
        Some(dir) if dir.is_dir() => {
            info!("serving web dashboard from {}", dir.display());
            let serve_dir = ServeDir::new(dir)
                .precompressed_br()
                .precompressed_gzip()
                .not_found_service(routes::not_found.into_service());
            app.fallback_service(serve_dir)
        }
        Some(dir) => {
            warn!("web dashboard directory not found at {}", dir.display());
            app.fallback(routes::not_found)
        }
        None => app.fallback(routes::not_found),
    }
}

#[cfg(not(feature = "web-dashboard"))]
fn with_fallback(app: Router, _config: &ApiConfig) -> Router {
    app.fallback(routes::not_found)
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
