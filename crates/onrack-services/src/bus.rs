//! In-process message bus for resource events.

use crate::error::Result;
use crate::lifecycle::Service;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Capacity of the broadcast channel.
const BROADCAST_CAPACITY: usize = 1024;

/// An event published on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusEvent {
    /// Topic name, e.g. `node.created`.
    pub topic: String,
    /// Event payload.
    pub data: serde_json::Value,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    /// Unique event id.
    pub event_id: String,
}

impl BusEvent {
    /// Creates an event stamped with the current time.
    pub fn new(topic: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            data,
            timestamp: onrack_types::now_millis(),
            event_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Broadcasts events on registered topics.
///
/// The bus accepts events only between `start` and `stop`. Events on
/// unregistered topics are dropped.
#[derive(Debug)]
pub struct MessageBus {
    tx: broadcast::Sender<BusEvent>,
    topics: RwLock<BTreeSet<String>>,
    open: AtomicBool,
}

impl MessageBus {
    /// Creates a closed bus with no topics.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            topics: RwLock::new(BTreeSet::new()),
            open: AtomicBool::new(false),
        }
    }

    /// Makes a topic publishable.
    pub fn register_topic(&self, topic: impl Into<String>) {
        let topic = topic.into();
        debug!(topic = %topic, "Topic registered");
        self.topics.write().insert(topic);
    }

    /// Registered topics, sorted.
    pub fn topics(&self) -> Vec<String> {
        self.topics.read().iter().cloned().collect()
    }

    /// Whether the bus is accepting events.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Subscribes to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Publishes `data` on `topic`.
    ///
    /// Returns whether the event was accepted. Having no subscribers still
    /// counts as accepted.
    pub fn publish(&self, topic: &str, data: serde_json::Value) -> bool {
        if !self.is_open() {
            debug!(topic = %topic, "Bus closed, event dropped");
            return false;
        }
        if !self.topics.read().contains(topic) {
            debug!(topic = %topic, "Unregistered topic, event dropped");
            return false;
        }

        let receivers = self.tx.send(BusEvent::new(topic, data)).unwrap_or(0);
        debug!(topic = %topic, receivers, "Event published");
        true
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for MessageBus {
    fn name(&self) -> &str {
        "message-bus"
    }

    async fn start(&self) -> Result<()> {
        self.open.store(true, Ordering::SeqCst);
        info!(topics = self.topics.read().len(), "Message bus open");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}
