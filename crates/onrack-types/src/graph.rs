//! Persisted task-graph executions.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle of a task-graph execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStatus {
    /// Still executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Stopped on request.
    Cancelled,
}

impl GraphStatus {
    /// Whether the graph is still executing.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Snapshot of a task-graph execution, keyed by `instance_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphObject {
    /// Execution instance id.
    pub instance_id: String,
    /// Graph definition name, e.g. `Graph.Discovery`.
    #[serde(default)]
    pub name: String,
    /// Target node, if the graph runs against one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
    /// Execution status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GraphStatus>,
    /// Options the graph was started with.
    #[serde(default)]
    pub options: Map<String, Value>,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub created_at: u64,
}

impl GraphObject {
    /// Creates a running graph object.
    pub fn running(
        instance_id: impl Into<String>,
        name: impl Into<String>,
        node: Option<NodeId>,
        options: Map<String, Value>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            name: name.into(),
            node,
            status: Some(GraphStatus::Running),
            options,
            created_at: crate::now_millis(),
        }
    }
}
