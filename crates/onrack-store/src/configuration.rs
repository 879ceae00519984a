//! In-memory configuration store.

use crate::traits::ConfigurationStore;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Process-local key/value settings.
#[derive(Debug, Default)]
pub struct MemoryConfiguration {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration seeded from a JSON object.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values: RwLock::new(values.into_iter().collect()),
        }
    }
}

impl ConfigurationStore for MemoryConfiguration {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        debug!(key = %key, "Configuration value set");
        self.values.write().insert(key.to_string(), value);
    }
}
