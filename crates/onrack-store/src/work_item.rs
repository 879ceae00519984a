//! In-memory work item repository.

use crate::error::Result;
use crate::traits::{WorkItemFilter, WorkItemRepository};
use async_trait::async_trait;
use onrack_types::{new_record_id, WorkItem};
use parking_lot::RwLock;
use tracing::debug;

/// Work item store kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryWorkItemRepository {
    items: RwLock<Vec<WorkItem>>,
}

impl MemoryWorkItemRepository {
    /// Creates an empty work item store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored work items.
    pub fn count(&self) -> usize {
        self.items.read().len()
    }
}

#[async_trait]
impl WorkItemRepository for MemoryWorkItemRepository {
    async fn create(&self, mut item: WorkItem) -> Result<WorkItem> {
        if item.id.is_empty() {
            item.id = new_record_id();
        }
        self.items.write().push(item.clone());
        Ok(item)
    }

    async fn find_pollers(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|i| i.node == filter.node && i.is_poller())
            .cloned()
            .collect())
    }

    async fn destroy(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>> {
        let mut items = self.items.write();
        let (removed, kept): (Vec<_>, Vec<_>) =
            items.drain(..).partition(|i| i.node == filter.node);
        *items = kept;
        debug!(node_id = %filter.node, removed = removed.len(), "Work items destroyed");
        Ok(removed)
    }
}
