//! Recording fakes and request helpers shared by the end-to-end tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use onrack_server::api::{create_router, AppState};
use onrack_server::health::HealthState;
use onrack_services::{
    GraphHandle, GraphTarget, MessageBus, MessagingResources, NodeResources, ObmService,
    Service, ServiceError, TaskGraphRunner,
};
use onrack_store::{
    CatalogRepository, ConfigurationStore, GraphObjectRepository, MemoryCatalogRepository,
    MemoryGraphObjectRepository, MemoryNodeRepository, MemoryWorkItemRepository, NodeRepository,
    NodeWithCatalogs, NodeWithWorkflows, Repositories, StoreError, WorkItemFilter,
    WorkItemRepository,
};
use onrack_types::{Catalog, Node, WorkItem};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Work item store that records every `destroy` filter.
#[derive(Default)]
pub struct RecordingWorkItems {
    inner: MemoryWorkItemRepository,
    pub destroyed: Mutex<Vec<WorkItemFilter>>,
}

#[async_trait]
impl WorkItemRepository for RecordingWorkItems {
    async fn create(&self, item: WorkItem) -> onrack_store::Result<WorkItem> {
        self.inner.create(item).await
    }

    async fn find_pollers(&self, filter: &WorkItemFilter) -> onrack_store::Result<Vec<WorkItem>> {
        self.inner.find_pollers(filter).await
    }

    async fn destroy(&self, filter: &WorkItemFilter) -> onrack_store::Result<Vec<WorkItem>> {
        self.destroyed.lock().push(filter.clone());
        self.inner.destroy(filter).await
    }
}

/// Catalog store whose lookups always fail.
pub struct FailingCatalogs;

#[async_trait]
impl CatalogRepository for FailingCatalogs {
    async fn create(&self, _catalog: Catalog) -> onrack_store::Result<Catalog> {
        Err(StoreError::Backend("catalog store offline".into()))
    }

    async fn find_by_node(&self, _node: &str) -> onrack_store::Result<Vec<Catalog>> {
        Err(StoreError::Backend("catalog store offline".into()))
    }

    async fn find_latest_catalog_of_source(
        &self,
        _node: &str,
        _source: &str,
    ) -> onrack_store::Result<Option<Catalog>> {
        Err(StoreError::Backend("catalog store offline".into()))
    }
}

/// Node store whose every call fails.
pub struct FailingNodes;

fn nodes_offline() -> StoreError {
    StoreError::Backend("node store offline".into())
}

#[async_trait]
impl NodeRepository for FailingNodes {
    async fn find(&self) -> onrack_store::Result<Vec<Node>> {
        Err(nodes_offline())
    }

    async fn create(&self, _node: Node) -> onrack_store::Result<Node> {
        Err(nodes_offline())
    }

    async fn find_by_identifier(&self, _identifier: &str) -> onrack_store::Result<Option<Node>> {
        Err(nodes_offline())
    }

    async fn update_by_identifier(
        &self,
        _identifier: &str,
        _patch: Map<String, Value>,
    ) -> onrack_store::Result<Option<Node>> {
        Err(nodes_offline())
    }

    async fn destroy_by_identifier(
        &self,
        _identifier: &str,
    ) -> onrack_store::Result<Option<Node>> {
        Err(nodes_offline())
    }

    async fn find_with_catalogs(
        &self,
        _identifier: &str,
    ) -> onrack_store::Result<Option<NodeWithCatalogs>> {
        Err(nodes_offline())
    }

    async fn find_with_workflows(
        &self,
        _identifier: &str,
    ) -> onrack_store::Result<Option<NodeWithWorkflows>> {
        Err(nodes_offline())
    }
}

/// Configuration store that records every `set`.
#[derive(Default)]
pub struct RecordingConfiguration {
    values: Mutex<HashMap<String, Value>>,
    pub sets: Mutex<Vec<(String, Value)>>,
}

impl RecordingConfiguration {
    /// Seeds a value without recording it.
    pub fn seed(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }

    pub fn set_calls(&self) -> Vec<(String, Value)> {
        self.sets.lock().clone()
    }
}

impl ConfigurationStore for RecordingConfiguration {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.sets.lock().push((key.to_string(), value.clone()));
        self.values.lock().insert(key.to_string(), value);
    }
}

/// Task-graph runner that records calls and answers from canned state.
#[derive(Default)]
pub struct RecordingTaskGraphs {
    pub runs: Mutex<Vec<(String, Map<String, Value>, String)>>,
    pub active_queries: Mutex<Vec<GraphTarget>>,
    pub cancels: Mutex<Vec<GraphTarget>>,
    pub active: Mutex<Option<GraphHandle>>,
}

#[async_trait]
impl TaskGraphRunner for RecordingTaskGraphs {
    async fn run_task_graph(
        &self,
        name: &str,
        options: Map<String, Value>,
        target: &str,
    ) -> onrack_services::Result<Value> {
        self.runs
            .lock()
            .push((name.to_string(), options, target.to_string()));
        Ok(json!({ "instanceId": "0987", "name": name }))
    }

    async fn get_active_task_graph(
        &self,
        filter: &GraphTarget,
    ) -> onrack_services::Result<Option<GraphHandle>> {
        self.active_queries.lock().push(filter.clone());
        Ok(self.active.lock().clone())
    }

    async fn cancel_task_graph(&self, filter: &GraphTarget) -> onrack_services::Result<Value> {
        self.cancels.lock().push(filter.clone());
        Ok(json!({ "instanceId": "0987", "status": "cancelled" }))
    }
}

/// OBM service that records `(node, on)` pairs.
#[derive(Default)]
pub struct RecordingObm {
    pub calls: Mutex<Vec<(String, bool)>>,
    pub fail: bool,
}

#[async_trait]
impl ObmService for RecordingObm {
    async fn identify_on(&self, node_id: &str) -> onrack_services::Result<Value> {
        self.record(node_id, true)
    }

    async fn identify_off(&self, node_id: &str) -> onrack_services::Result<Value> {
        self.record(node_id, false)
    }
}

impl RecordingObm {
    fn record(&self, node_id: &str, on: bool) -> onrack_services::Result<Value> {
        if self.fail {
            return Err(ServiceError::Driver {
                service: "ipmi-obm-service".into(),
                message: "timeout".into(),
            });
        }
        self.calls.lock().push((node_id.to_string(), on));
        Ok(json!({ "node": node_id, "on": on }))
    }
}

/// Router plus handles on every fake behind it.
pub struct TestApp {
    pub app: Router,
    pub repos: Repositories,
    pub work_items: Arc<RecordingWorkItems>,
    pub configuration: Arc<RecordingConfiguration>,
    pub task_graphs: Arc<RecordingTaskGraphs>,
    pub obm: Arc<RecordingObm>,
    pub bus: Arc<MessageBus>,
}

/// Options for [`test_app_with`].
#[derive(Default)]
pub struct TestAppOptions {
    pub failing_nodes: bool,
    pub failing_catalogs: bool,
    pub failing_obm: bool,
}

pub async fn test_app() -> TestApp {
    test_app_with(TestAppOptions::default()).await
}

pub async fn test_app_with(options: TestAppOptions) -> TestApp {
    let catalogs: Arc<dyn CatalogRepository> = if options.failing_catalogs {
        Arc::new(FailingCatalogs)
    } else {
        Arc::new(MemoryCatalogRepository::new())
    };
    let graph_objects: Arc<dyn GraphObjectRepository> =
        Arc::new(MemoryGraphObjectRepository::new());
    let work_items = Arc::new(RecordingWorkItems::default());
    let nodes: Arc<dyn NodeRepository> = if options.failing_nodes {
        Arc::new(FailingNodes)
    } else {
        Arc::new(MemoryNodeRepository::new(
            catalogs.clone(),
            graph_objects.clone(),
        ))
    };
    let repos = Repositories {
        nodes,
        catalogs,
        work_items: work_items.clone(),
        graph_objects,
    };

    let configuration = Arc::new(RecordingConfiguration::default());
    let task_graphs = Arc::new(RecordingTaskGraphs::default());
    let obm = Arc::new(RecordingObm {
        fail: options.failing_obm,
        ..RecordingObm::default()
    });
    let bus = Arc::new(MessageBus::new());
    NodeResources.register(&bus);
    bus.start().await.unwrap();

    let state = AppState::new(
        repos.clone(),
        configuration.clone(),
        task_graphs.clone(),
        obm.clone(),
        bus.clone(),
    );

    TestApp {
        app: create_router(state, HealthState::new()),
        repos,
        work_items,
        configuration,
        task_graphs,
        obm,
        bus,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }
}

pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}
