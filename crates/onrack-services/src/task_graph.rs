//! Task-graph runner interface and an in-process implementation.
//!
//! The HTTP layer treats the runner as an opaque remote: it starts a graph
//! against a node, asks which graph is active for a node, and cancels it.

use crate::error::{Result, ServiceError};
use crate::lifecycle::Service;
use async_trait::async_trait;
use onrack_store::{GraphObjectQuery, GraphObjectRepository};
use onrack_types::{GraphObject, GraphStatus, NodeId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Selects the graph running against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphTarget {
    /// Target node id.
    pub target: NodeId,
}

impl GraphTarget {
    /// Selector for `target`.
    pub fn new(target: impl Into<NodeId>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Reference to an executing graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphHandle {
    /// Execution instance id.
    pub instance_id: String,
    /// Graph definition name.
    pub name: String,
}

/// Runs, inspects and cancels task graphs.
#[async_trait]
pub trait TaskGraphRunner: Send + Sync {
    /// Starts graph `name` against `target` with `options`.
    async fn run_task_graph(
        &self,
        name: &str,
        options: Map<String, Value>,
        target: &str,
    ) -> Result<Value>;

    /// Returns the graph currently executing against the target, if any.
    async fn get_active_task_graph(&self, filter: &GraphTarget) -> Result<Option<GraphHandle>>;

    /// Cancels the graph executing against the target.
    async fn cancel_task_graph(&self, filter: &GraphTarget) -> Result<Value>;
}

/// Runs graphs in-process, one active graph per target.
///
/// Every started graph is recorded as a [`GraphObject`] so it shows up in the
/// node's workflow history.
pub struct LocalTaskGraphRunner {
    graphs: Arc<dyn GraphObjectRepository>,
    active: RwLock<HashMap<NodeId, GraphHandle>>,
}

impl LocalTaskGraphRunner {
    /// Creates a runner that records graphs in `graphs`.
    pub fn new(graphs: Arc<dyn GraphObjectRepository>) -> Self {
        Self {
            graphs,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Number of graphs currently executing.
    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    async fn mark_cancelled(&self, handle: &GraphHandle) -> Result<()> {
        let query = GraphObjectQuery {
            instance_id: handle.instance_id.clone(),
        };
        if let Some(mut graph) = self.graphs.find_one(&query).await? {
            graph.status = Some(GraphStatus::Cancelled);
            self.graphs.upsert(graph).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TaskGraphRunner for LocalTaskGraphRunner {
    async fn run_task_graph(
        &self,
        name: &str,
        options: Map<String, Value>,
        target: &str,
    ) -> Result<Value> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("graph name cannot be empty".into()));
        }

        let handle = GraphHandle {
            instance_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
        };

        // Reserve the target before the first await so two runs cannot race.
        {
            let mut active = self.active.write();
            if let Some(existing) = active.get(target) {
                return Err(ServiceError::Conflict(format!(
                    "graph {} is already running against {}",
                    existing.name, target
                )));
            }
            active.insert(target.to_string(), handle.clone());
        }

        let graph = GraphObject::running(
            handle.instance_id.clone(),
            name,
            Some(target.to_string()),
            options,
        );
        let graph = match self.graphs.upsert(graph).await {
            Ok(graph) => graph,
            Err(e) => {
                self.active.write().remove(target);
                return Err(e.into());
            }
        };

        info!(graph = %name, instance_id = %handle.instance_id, target = %target, "Task graph started");
        Ok(serde_json::to_value(graph)?)
    }

    async fn get_active_task_graph(&self, filter: &GraphTarget) -> Result<Option<GraphHandle>> {
        Ok(self.active.read().get(&filter.target).cloned())
    }

    async fn cancel_task_graph(&self, filter: &GraphTarget) -> Result<Value> {
        let handle = self
            .active
            .write()
            .remove(&filter.target)
            .ok_or_else(|| ServiceError::NotFound(format!("no active graph for {}", filter.target)))?;

        self.mark_cancelled(&handle).await?;
        info!(instance_id = %handle.instance_id, target = %filter.target, "Task graph cancelled");

        Ok(json!({
            "instanceId": handle.instance_id,
            "name": handle.name,
            "status": GraphStatus::Cancelled,
        }))
    }
}

#[async_trait]
impl Service for LocalTaskGraphRunner {
    fn name(&self) -> &str {
        "task-graph-runner"
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Cancels everything still running.
    async fn stop(&self) -> Result<()> {
        let drained: Vec<GraphHandle> = self.active.write().drain().map(|(_, h)| h).collect();
        for handle in &drained {
            if let Err(e) = self.mark_cancelled(handle).await {
                warn!(instance_id = %handle.instance_id, error = %e, "Failed to record cancellation");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onrack_store::MemoryGraphObjectRepository;
    use pretty_assertions::assert_eq;

    fn runner() -> (LocalTaskGraphRunner, Arc<MemoryGraphObjectRepository>) {
        let graphs = Arc::new(MemoryGraphObjectRepository::new());
        (LocalTaskGraphRunner::new(graphs.clone()), graphs)
    }

    #[tokio::test]
    async fn run_records_graph_and_marks_active() {
        let (runner, graphs) = runner();
        let options = json!({ "prop": 555 }).as_object().cloned().unwrap();

        let started = runner
            .run_task_graph("Graph.Discovery", options, "n1")
            .await
            .unwrap();
        assert_eq!(started["status"], json!("running"));
        assert_eq!(started["options"]["prop"], json!(555));

        let handle = runner
            .get_active_task_graph(&GraphTarget::new("n1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(handle.name, "Graph.Discovery");
        assert_eq!(graphs.find_by_node("n1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_active_graph_per_target() {
        let (runner, _) = runner();
        runner.run_task_graph("Graph.A", Map::new(), "n1").await.unwrap();

        let err = runner
            .run_task_graph("Graph.B", Map::new(), "n1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        runner.run_task_graph("Graph.B", Map::new(), "n2").await.unwrap();
        assert_eq!(runner.active_count(), 2);
    }

    #[tokio::test]
    async fn cancel_clears_active_and_records_status() {
        let (runner, graphs) = runner();
        runner.run_task_graph("Graph.A", Map::new(), "n1").await.unwrap();

        let cancelled = runner
            .cancel_task_graph(&GraphTarget::new("n1"))
            .await
            .unwrap();
        assert_eq!(cancelled["status"], json!("cancelled"));
        assert!(runner
            .get_active_task_graph(&GraphTarget::new("n1"))
            .await
            .unwrap()
            .is_none());

        let stored = graphs.find_by_node("n1").await.unwrap();
        assert_eq!(stored[0].status, Some(GraphStatus::Cancelled));

        let err = runner
            .cancel_task_graph(&GraphTarget::new("n1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let (runner, _) = runner();
        let err = runner.run_task_graph(" ", Map::new(), "n1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(runner.active_count(), 0);
    }

    #[tokio::test]
    async fn stop_cancels_running_graphs() {
        let (runner, graphs) = runner();
        runner.run_task_graph("Graph.A", Map::new(), "n1").await.unwrap();

        Service::stop(&runner).await.unwrap();
        assert_eq!(runner.active_count(), 0);
        assert_eq!(
            graphs.find_by_node("n1").await.unwrap()[0].status,
            Some(GraphStatus::Cancelled)
        );
    }
}
