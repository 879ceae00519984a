//! Inventory record types used throughout `onrack`.
//!
//! A [`Node`] is a managed piece of hardware. Everything else in this crate
//! hangs off a node id: discovered [`Catalog`] snapshots, recurring
//! [`WorkItem`] pollers, and [`GraphObject`] workflow records.

mod catalog;
mod error;
mod graph;
mod mac;
mod node;
mod whitelist;
mod work_item;

pub use catalog::Catalog;
pub use error::{Result, TypesError};
pub use graph::{GraphObject, GraphStatus};
pub use mac::MacAddress;
pub use node::{new_record_id, Node, NodeId, ObmSetting};
pub use whitelist::{Whitelist, WHITELIST_KEY};
pub use work_item::{Poller, WorkItem, POLLER_PREFIX};

/// Milliseconds since the Unix epoch, used for record timestamps.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
