//! DHCP MAC whitelist stored as a single configuration value.

use crate::error::Result;
use crate::mac::MacAddress;
use serde_json::Value;

/// Configuration key holding the whitelist.
pub const WHITELIST_KEY: &str = "whitelist";

/// Ordered list of normalized MAC addresses allowed DHCP service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist(Vec<String>);

impl Whitelist {
    /// Reads a whitelist from its stored value; a missing or null value is empty.
    pub fn from_value(value: Option<Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Ok(Self(serde_json::from_value(value)?)),
        }
    }

    /// Stored representation.
    pub fn to_value(&self) -> Value {
        Value::from(self.0.clone())
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `mac` is listed.
    pub fn contains(&self, mac: &MacAddress) -> bool {
        self.0.iter().any(|m| m == mac.as_str())
    }

    /// Appends `mac` unless it is already listed. Returns true if added.
    pub fn add(&mut self, mac: &MacAddress) -> bool {
        if self.contains(mac) {
            return false;
        }
        self.0.push(mac.to_string());
        true
    }

    /// Removes every occurrence of `mac`. Returns true if anything was removed.
    pub fn remove(&mut self, mac: &MacAddress) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m != mac.as_str());
        self.0.len() != before
    }
}
