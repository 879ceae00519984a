//! Messaging resources exposed on the bus.

use crate::bus::MessageBus;

/// Published after a node is created.
pub const NODE_CREATED: &str = "node.created";
/// Published after a node is patched or gains an OBM setting.
pub const NODE_UPDATED: &str = "node.updated";
/// Published after a node is deleted.
pub const NODE_DELETED: &str = "node.deleted";
/// Published after an identify request succeeds.
pub const NODE_OBM_IDENTIFY: &str = "node.obm.identify";

/// A group of topics registered with the bus at startup.
pub trait MessagingResources: Send + Sync {
    /// Resource name used in logs.
    fn name(&self) -> &str;

    /// Registers the resource's topics.
    fn register(&self, bus: &MessageBus);
}

/// Node lifecycle topics.
#[derive(Debug, Default, Clone)]
pub struct NodeResources;

impl NodeResources {
    /// Topics owned by the node resource.
    pub const TOPICS: [&'static str; 4] =
        [NODE_CREATED, NODE_UPDATED, NODE_DELETED, NODE_OBM_IDENTIFY];
}

impl MessagingResources for NodeResources {
    fn name(&self) -> &str {
        "nodes"
    }

    fn register(&self, bus: &MessageBus) {
        for topic in Self::TOPICS {
            bus.register_topic(topic);
        }
    }
}
