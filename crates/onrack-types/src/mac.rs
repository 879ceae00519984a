//! MAC address parsing and normalization.

use crate::error::{Result, TypesError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Six two-digit hex groups separated by `:` or `-`.
static MAC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}([:-][0-9A-Fa-f]{2}){5}$").expect("valid MAC regex")
});

/// A MAC address in canonical hyphen-separated form.
///
/// Case is preserved; only the separator is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parses a colon or hyphen separated MAC address.
    pub fn parse(input: &str) -> Result<Self> {
        if !MAC_REGEX.is_match(input) {
            return Err(TypesError::InvalidMac(input.to_string()));
        }
        Ok(Self(input.replace(':', "-")))
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
