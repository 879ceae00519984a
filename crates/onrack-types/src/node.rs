//! Node records and their out-of-band management settings.

use crate::error::{Result, TypesError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque node identifier.
pub type NodeId = String;

/// Out-of-band management settings for a node.
///
/// `service` names the driver that understands `config`
/// (for example `ipmi-obm-service`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObmSetting {
    /// Driver name.
    pub service: String,
    /// Driver specific configuration.
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ObmSetting {
    /// Creates a new OBM setting.
    pub fn new(service: impl Into<String>, config: Map<String, Value>) -> Self {
        Self {
            service: service.into(),
            config,
        }
    }

    /// Checks that the setting names a driver.
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(TypesError::invalid_field("service", "cannot be empty"));
        }
        Ok(())
    }
}

/// A managed hardware inventory entry.
///
/// Fields the server does not interpret are kept in `extra` and written back
/// unchanged, so clients can round-trip their own attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node identifier; immutable once assigned.
    #[serde(default)]
    pub id: NodeId,
    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Alternate lookup keys, usually MAC addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
    /// OBM settings in the order they were added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obm_settings: Option<Vec<ObmSetting>>,
    /// Client supplied attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Creates an empty node with the given id.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            identifiers: Vec::new(),
            obm_settings: None,
            extra: Map::new(),
        }
    }

    /// Sets the OBM settings.
    pub fn with_obm_settings(mut self, settings: Vec<ObmSetting>) -> Self {
        self.obm_settings = Some(settings);
        self
    }

    /// Adds an alternate identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifiers.push(identifier.into());
        self
    }

    /// Builds a node from a JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(TypesError::invalid_field("node", "expected a JSON object"));
        }
        let node: Node = serde_json::from_value(value)?;
        if let Some(settings) = &node.obm_settings {
            settings.iter().try_for_each(ObmSetting::validate)?;
        }
        Ok(node)
    }

    /// Returns true if `identifier` is the node id or one of its alternate keys.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.id == identifier || self.identifiers.iter().any(|i| i == identifier)
    }

    /// OBM settings, empty when none are configured.
    pub fn obm_settings(&self) -> &[ObmSetting] {
        self.obm_settings.as_deref().unwrap_or_default()
    }

    /// Returns the OBM settings with `setting` appended, preserving order.
    pub fn appended_obm_settings(&self, setting: ObmSetting) -> Vec<ObmSetting> {
        let mut settings = self.obm_settings().to_vec();
        settings.push(setting);
        settings
    }

    /// Merges top-level fields from `patch` into the node.
    ///
    /// The `id` key is ignored.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<()> {
        let Value::Object(mut fields) = serde_json::to_value(&*self)? else {
            return Err(TypesError::invalid_field("node", "expected a JSON object"));
        };
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }

        let mut updated = Node::from_value(Value::Object(fields))?;
        updated.id.clone_from(&self.id);
        *self = updated;
        Ok(())
    }
}

/// Generates a new 24 hex digit record id.
pub fn new_record_id() -> String {
    hex::encode(&uuid::Uuid::new_v4().as_bytes()[..12])
}
