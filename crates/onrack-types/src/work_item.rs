//! Work items and the poller view exposed to clients.

use crate::node::{new_record_id, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name prefix shared by every poller work item.
pub const POLLER_PREFIX: &str = "Pollers.";

/// A recurring background task bound to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Work item id.
    #[serde(default)]
    pub id: String,
    /// Node the item collects from.
    pub node: NodeId,
    /// Dotted task name, e.g. `Pollers.IPMI`.
    pub name: String,
    /// Task configuration.
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl WorkItem {
    /// Creates a work item with a fresh id.
    pub fn new(node: impl Into<NodeId>, name: impl Into<String>, config: Map<String, Value>) -> Self {
        Self {
            id: new_record_id(),
            node: node.into(),
            name: name.into(),
            config,
        }
    }

    /// Whether this item is a poller.
    pub fn is_poller(&self) -> bool {
        self.name.starts_with(POLLER_PREFIX)
    }
}

/// Client view of a poller work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poller {
    /// Work item id.
    pub id: String,
    /// Lowercase poller kind derived from the work item name.
    #[serde(rename = "type")]
    pub poller_type: String,
    /// Poller configuration.
    pub config: Map<String, Value>,
}

impl Poller {
    /// Derives the poller type from a work item name: `Pollers.IPMI` -> `ipmi`.
    pub fn type_from_name(name: &str) -> String {
        name.rsplit('.').next().unwrap_or(name).to_lowercase()
    }
}

impl From<&WorkItem> for Poller {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id.clone(),
            poller_type: Self::type_from_name(&item.name),
            config: item.config.clone(),
        }
    }
}
