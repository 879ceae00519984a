//! HTTP API for the node inventory.
//!
//! Every route is served under both `/api/1.1` and the legacy `/api/common`
//! prefix. Errors are JSON bodies of the form `{"error": .., "message": ..}`.

use crate::dhcp_api::dhcp_routes;
use crate::error::ApiError;
use crate::health::{health_routes, HealthState};
use crate::nodes_api::node_routes;
use crate::observability::{metrics_handler, metrics_middleware, request_id_middleware};
use crate::workflow_api::workflow_routes;
use axum::{middleware, routing::get, Router};
use onrack_services::{MessageBus, ObmService, TaskGraphRunner};
use onrack_store::{ConfigurationStore, Repositories};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Current API mount point.
pub const API_PREFIX: &str = "/api/1.1";

/// Legacy mount point kept for older clients.
pub const LEGACY_API_PREFIX: &str = "/api/common";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Inventory repositories.
    pub repos: Repositories,
    /// Runtime key/value settings.
    pub configuration: Arc<dyn ConfigurationStore>,
    /// Task-graph runner.
    pub task_graphs: Arc<dyn TaskGraphRunner>,
    /// OBM service.
    pub obm: Arc<dyn ObmService>,
    /// Resource event bus.
    pub bus: Arc<MessageBus>,
    /// Serializes whitelist read-modify-write cycles.
    pub whitelist_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Creates the state.
    pub fn new(
        repos: Repositories,
        configuration: Arc<dyn ConfigurationStore>,
        task_graphs: Arc<dyn TaskGraphRunner>,
        obm: Arc<dyn ObmService>,
        bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            repos,
            configuration,
            task_graphs,
            obm,
            bus,
            whitelist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Publishes a resource event; a closed bus drops it.
    pub fn publish(&self, topic: &str, data: serde_json::Value) {
        if !self.bus.publish(topic, data) {
            tracing::trace!(topic = %topic, "Event not published");
        }
    }
}

/// Routes shared by both mount points.
pub fn api_routes() -> Router<AppState> {
    node_routes()
        .merge(workflow_routes())
        .merge(dhcp_routes())
        .route_layer(middleware::from_fn(metrics_middleware))
}

/// Creates the full router.
pub fn create_router(state: AppState, health: HealthState) -> Router {
    Router::new()
        .nest(API_PREFIX, api_routes())
        .nest(LEGACY_API_PREFIX, api_routes())
        .route("/metrics", get(metrics_handler))
        .merge(health_routes(health))
        .fallback(fallback)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
