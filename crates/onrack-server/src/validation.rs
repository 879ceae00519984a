//! Request and settings validation.

use crate::error::ApiError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

/// Task-graph names: dotted identifiers such as `Graph.Discovery`.
pub static GRAPH_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("Invalid regex"));

/// Accepted log levels.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Body of `POST /nodes/{id}/obm`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ObmSettingRequest {
    /// Driver name.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
    /// Driver configuration.
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Body of `POST /nodes/{id}/obm/identify`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdentifyRequest {
    /// Whether the identify light should be on.
    pub value: bool,
}

/// Parses a JSON body and runs its validators.
pub fn parse_validated<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let value: T = parse_json(body)?;
    value.validate()?;
    Ok(value)
}

/// Parses a JSON body.
pub fn parse_json<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {}", e)))
}

/// Checks a task-graph name.
pub fn validate_graph_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > 256 || !GRAPH_NAME_REGEX.is_match(name) {
        let mut err = ValidationError::new("pattern");
        err.message = Some("Graph name must be a dotted identifier".into());
        return Err(err);
    }
    Ok(())
}

/// Checks a log level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        let mut err = ValidationError::new("log_level");
        err.message = Some(format!("Log level must be one of {}", LOG_LEVELS.join(", ")).into());
        return Err(err);
    }
    Ok(())
}

/// Checks a log format name.
pub fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    if !matches!(format.to_lowercase().as_str(), "pretty" | "json") {
        let mut err = ValidationError::new("log_format");
        err.message = Some("Log format must be pretty or json".into());
        return Err(err);
    }
    Ok(())
}

/// Flattens field errors into one line.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: failed {} check", field, e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::BadRequest(describe(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn graph_names() {
        assert!(validate_graph_name("Graph.Discovery").is_ok());
        assert!(validate_graph_name("TestGraph.Dummy").is_ok());
        assert!(validate_graph_name("noop").is_ok());

        assert!(validate_graph_name("").is_err());
        assert!(validate_graph_name("Graph..Discovery").is_err());
        assert!(validate_graph_name(".Graph").is_err());
        assert!(validate_graph_name("Graph Discovery").is_err());
    }

    #[test]
    fn obm_setting_body() {
        let ok: ObmSettingRequest =
            parse_validated(br#"{"service":"ipmi-obm-service","config":{"host":"1.2.3.4"}}"#)
                .unwrap();
        assert_eq!(ok.service, "ipmi-obm-service");

        let empty = parse_validated::<ObmSettingRequest>(br#"{"service":""}"#).unwrap_err();
        assert!(matches!(empty, ApiError::BadRequest(ref m) if m.starts_with("service")));

        assert!(parse_validated::<ObmSettingRequest>(br#"{"config":{}}"#).is_err());
        assert!(parse_validated::<ObmSettingRequest>(b"not json").is_err());
    }

    #[test]
    fn identify_body() {
        assert!(parse_json::<IdentifyRequest>(br#"{"value":true}"#).unwrap().value);
        assert!(parse_json::<IdentifyRequest>(br#"{"value":"yes"}"#).is_err());
        assert!(parse_json::<IdentifyRequest>(b"{}").is_err());
    }

    #[test]
    fn log_settings() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("loud").is_err());
        assert!(validate_log_format("json").is_ok());
        assert!(validate_log_format("xml").is_err());
    }

    proptest! {
        #[test]
        fn dotted_identifiers_are_graph_names(
            parts in proptest::collection::vec("[A-Za-z0-9_-]{1,12}", 1..5)
        ) {
            prop_assert!(validate_graph_name(&parts.join(".")).is_ok());
        }

        #[test]
        fn whitespace_is_never_a_graph_name(prefix in "[A-Za-z]{1,8}", suffix in "[A-Za-z]{0,8}") {
            let name = format!("{} {}", prefix, suffix);
            prop_assert!(validate_graph_name(&name).is_err());
        }
    }
}
