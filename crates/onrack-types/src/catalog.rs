//! Catalog snapshots of discovered node data.

use crate::node::{new_record_id, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data discovered about a node from a single source (dmi, lshw, ...).
///
/// A node may carry any number of catalogs per source; the latest one is
/// chosen at query time by `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Catalog id.
    #[serde(default)]
    pub id: String,
    /// Owning node.
    pub node: NodeId,
    /// Source that produced the data.
    pub source: String,
    /// Discovered data.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub created_at: u64,
}

impl Catalog {
    /// Creates a catalog stamped with the current time.
    pub fn new(node: impl Into<NodeId>, source: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: new_record_id(),
            node: node.into(),
            source: source.into(),
            data,
            created_at: crate::now_millis(),
        }
    }
}
