//! In-memory node repository.

use crate::error::{Result, StoreError};
use crate::traits::{
    CatalogRepository, GraphObjectRepository, NodeRepository, NodeWithCatalogs,
    NodeWithWorkflows,
};
use async_trait::async_trait;
use onrack_types::{new_record_id, Node, ObmSetting};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Node store kept in insertion order.
///
/// Joined queries read catalogs and graph objects through the sibling
/// repositories, so relations are never embedded in the stored node.
pub struct MemoryNodeRepository {
    nodes: RwLock<Vec<Node>>,
    catalogs: Arc<dyn CatalogRepository>,
    graphs: Arc<dyn GraphObjectRepository>,
}

impl MemoryNodeRepository {
    /// Creates an empty node store joined to the given relation stores.
    pub fn new(catalogs: Arc<dyn CatalogRepository>, graphs: Arc<dyn GraphObjectRepository>) -> Self {
        Self {
            nodes: RwLock::new(Vec::new()),
            catalogs,
            graphs,
        }
    }

    /// Number of stored nodes.
    pub fn count(&self) -> usize {
        self.nodes.read().len()
    }
}

#[async_trait]
impl NodeRepository for MemoryNodeRepository {
    async fn find(&self) -> Result<Vec<Node>> {
        Ok(self.nodes.read().clone())
    }

    async fn create(&self, mut node: Node) -> Result<Node> {
        node.obm_settings().iter().try_for_each(ObmSetting::validate)?;
        if node.id.is_empty() {
            node.id = new_record_id();
        }

        let mut nodes = self.nodes.write();
        if nodes.iter().any(|n| n.id == node.id) {
            return Err(StoreError::conflict("node", node.id));
        }
        nodes.push(node.clone());
        debug!(node_id = %node.id, "Node created");
        Ok(node)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Node>> {
        Ok(self
            .nodes
            .read()
            .iter()
            .find(|n| n.matches_identifier(identifier))
            .cloned())
    }

    async fn update_by_identifier(
        &self,
        identifier: &str,
        patch: Map<String, Value>,
    ) -> Result<Option<Node>> {
        let mut nodes = self.nodes.write();
        let Some(slot) = nodes.iter_mut().find(|n| n.matches_identifier(identifier)) else {
            return Ok(None);
        };

        let mut updated = slot.clone();
        updated.apply_patch(&patch)?;
        *slot = updated.clone();
        debug!(node_id = %updated.id, fields = patch.len(), "Node updated");
        Ok(Some(updated))
    }

    async fn destroy_by_identifier(&self, identifier: &str) -> Result<Option<Node>> {
        let mut nodes = self.nodes.write();
        let index = nodes.iter().position(|n| n.matches_identifier(identifier));
        let removed = index.map(|index| nodes.remove(index));
        if let Some(node) = &removed {
            debug!(node_id = %node.id, "Node destroyed");
        }
        Ok(removed)
    }

    async fn find_with_catalogs(&self, identifier: &str) -> Result<Option<NodeWithCatalogs>> {
        let Some(node) = self.find_by_identifier(identifier).await? else {
            return Ok(None);
        };
        let catalogs = self.catalogs.find_by_node(&node.id).await?;
        Ok(Some(NodeWithCatalogs { node, catalogs }))
    }

    async fn find_with_workflows(&self, identifier: &str) -> Result<Option<NodeWithWorkflows>> {
        let Some(node) = self.find_by_identifier(identifier).await? else {
            return Ok(None);
        };
        let workflows = self.graphs.find_by_node(&node.id).await?;
        Ok(Some(NodeWithWorkflows { node, workflows }))
    }
}
