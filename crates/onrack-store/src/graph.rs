//! In-memory graph object repository.

use crate::error::Result;
use crate::traits::{GraphObjectQuery, GraphObjectRepository};
use async_trait::async_trait;
use onrack_types::GraphObject;
use parking_lot::RwLock;

/// Graph object store keyed by instance id, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryGraphObjectRepository {
    graphs: RwLock<Vec<GraphObject>>,
}

impl MemoryGraphObjectRepository {
    /// Creates an empty graph object store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphObjectRepository for MemoryGraphObjectRepository {
    async fn upsert(&self, graph: GraphObject) -> Result<GraphObject> {
        let mut graphs = self.graphs.write();
        let index = graphs.iter().position(|g| g.instance_id == graph.instance_id);
        match index {
            Some(index) => graphs[index] = graph.clone(),
            None => graphs.push(graph.clone()),
        }
        Ok(graph)
    }

    async fn find_one(&self, query: &GraphObjectQuery) -> Result<Option<GraphObject>> {
        Ok(self
            .graphs
            .read()
            .iter()
            .find(|g| g.instance_id == query.instance_id)
            .cloned())
    }

    async fn find_by_node(&self, node: &str) -> Result<Vec<GraphObject>> {
        Ok(self
            .graphs
            .read()
            .iter()
            .filter(|g| g.node.as_deref() == Some(node))
            .cloned()
            .collect())
    }
}
