//! Service settings.
//!
//! Sources are layered: built-in defaults, then an optional YAML file, then
//! `ONRACK_*` environment variables (`ONRACK_HTTPPORT=9090`,
//! `ONRACK_WHITELIST=00-11-22-33-44-55,00-11-22-33-44-66`).

use crate::validation::{validate_log_format, validate_log_level};
use onrack_types::{MacAddress, WHITELIST_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value failed validation.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Runtime settings of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Listen address.
    pub httpaddr: IpAddr,
    /// Listen port; 0 picks a free port.
    pub httpport: u16,
    /// Log level used when `RUST_LOG` is unset.
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,
    /// `pretty` or `json`.
    #[validate(custom(function = "validate_log_format"))]
    pub log_format: String,
    /// Root directory of the file store.
    pub file_store_root: PathBuf,
    /// Initial DHCP whitelist.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            httpaddr: IpAddr::from([0, 0, 0, 0]),
            httpport: 8080,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            file_store_root: PathBuf::from("./data/files"),
            whitelist: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from defaults, `path` (if it exists) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = ::config::Config::builder()
            .set_default("httpaddr", defaults.httpaddr.to_string())?
            .set_default("httpport", i64::from(defaults.httpport))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?
            .set_default(
                "file_store_root",
                defaults.file_store_root.to_string_lossy().into_owned(),
            )?
            .set_default("whitelist", Vec::<String>::new())?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(
                ::config::Environment::with_prefix("ONRACK")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("whitelist"),
            )
            .build()?
            .try_deserialize()?;

        settings.validated()
    }

    /// Runs field validation and normalizes whitelist entries.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Invalid(crate::validation::describe(&e)))?;

        self.whitelist = self
            .whitelist
            .iter()
            .map(|mac| MacAddress::parse(mac).map(String::from))
            .collect::<Result<_, _>>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(self)
    }

    /// Socket address to bind.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.httpaddr, self.httpport)
    }

    /// Key/value view used to seed the configuration store.
    pub fn to_configuration(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("httpaddr".into(), Value::from(self.httpaddr.to_string()));
        values.insert("httpport".into(), Value::from(self.httpport));
        values.insert("log_level".into(), Value::from(self.log_level.clone()));
        values.insert("log_format".into(), Value::from(self.log_format.clone()));
        values.insert(
            "file_store_root".into(),
            Value::from(self.file_store_root.to_string_lossy().into_owned()),
        );
        values.insert(WHITELIST_KEY.into(), Value::from(self.whitelist.clone()));
        values
    }
}
