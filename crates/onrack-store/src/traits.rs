//! Repository interfaces consumed by the HTTP layer.
//!
//! Every lookup reports absence as `Ok(None)` or an empty `Vec`; errors are
//! reserved for real backend faults.

use crate::error::Result;
use async_trait::async_trait;
use onrack_types::{Catalog, GraphObject, Node, NodeId, WorkItem};
use serde::Serialize;
use serde_json::{Map, Value};

/// Selects work items belonging to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemFilter {
    /// Owning node id.
    pub node: NodeId,
}

impl WorkItemFilter {
    /// Filter for items owned by `node`.
    pub fn node(node: impl Into<NodeId>) -> Self {
        Self { node: node.into() }
    }
}

/// Selects a graph object by execution instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphObjectQuery {
    /// Execution instance id.
    pub instance_id: String,
}

/// A node joined with its catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWithCatalogs {
    /// The node.
    pub node: Node,
    /// Every catalog recorded for the node.
    pub catalogs: Vec<Catalog>,
}

/// A node joined with its workflow graph objects.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWithWorkflows {
    /// The node.
    pub node: Node,
    /// Graph objects that targeted the node.
    pub workflows: Vec<GraphObject>,
}

/// Node persistence.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Lists all nodes.
    async fn find(&self) -> Result<Vec<Node>>;

    /// Stores a new node, assigning an id when it has none.
    async fn create(&self, node: Node) -> Result<Node>;

    /// Finds a node by id or alternate identifier.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Node>>;

    /// Merges `patch` into the node and returns the updated record.
    async fn update_by_identifier(
        &self,
        identifier: &str,
        patch: Map<String, Value>,
    ) -> Result<Option<Node>>;

    /// Removes the node and returns the removed record.
    async fn destroy_by_identifier(&self, identifier: &str) -> Result<Option<Node>>;

    /// Finds a node together with its catalogs.
    async fn find_with_catalogs(&self, identifier: &str) -> Result<Option<NodeWithCatalogs>>;

    /// Finds a node together with its workflow graph objects.
    async fn find_with_workflows(&self, identifier: &str) -> Result<Option<NodeWithWorkflows>>;
}

/// Catalog persistence.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Stores a catalog.
    async fn create(&self, catalog: Catalog) -> Result<Catalog>;

    /// Lists catalogs recorded for a node, oldest first.
    async fn find_by_node(&self, node: &str) -> Result<Vec<Catalog>>;

    /// Returns the newest catalog of `source` for a node.
    async fn find_latest_catalog_of_source(
        &self,
        node: &str,
        source: &str,
    ) -> Result<Option<Catalog>>;
}

/// Work item persistence.
#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    /// Stores a work item.
    async fn create(&self, item: WorkItem) -> Result<WorkItem>;

    /// Lists poller work items matching `filter`.
    async fn find_pollers(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>>;

    /// Removes every work item matching `filter` and returns them.
    async fn destroy(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>>;
}

/// Graph object persistence.
#[async_trait]
pub trait GraphObjectRepository: Send + Sync {
    /// Inserts or replaces a graph object keyed by instance id.
    async fn upsert(&self, graph: GraphObject) -> Result<GraphObject>;

    /// Finds a graph object by instance id.
    async fn find_one(&self, query: &GraphObjectQuery) -> Result<Option<GraphObject>>;

    /// Lists graph objects that targeted a node, oldest first.
    async fn find_by_node(&self, node: &str) -> Result<Vec<GraphObject>>;
}

/// Key/value runtime settings.
pub trait ConfigurationStore: Send + Sync {
    /// Reads a setting.
    fn get(&self, key: &str) -> Option<Value>;

    /// Writes a setting.
    fn set(&self, key: &str, value: Value);
}
