//! Out-of-band management: identify-light control routed to a per-node driver.

use crate::error::{Result, ServiceError};
use async_trait::async_trait;
use onrack_store::NodeRepository;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Service name of the built-in driver that accepts every request.
pub const NOOP_OBM_SERVICE: &str = "noop-obm-service";

/// Desired identify-light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifyState {
    /// Light on.
    On,
    /// Light off.
    Off,
}

impl From<bool> for IdentifyState {
    fn from(value: bool) -> Self {
        if value {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// OBM operations consumed by the HTTP layer.
#[async_trait]
pub trait ObmService: Send + Sync {
    /// Turns the identify light of a node on.
    async fn identify_on(&self, node_id: &str) -> Result<Value>;

    /// Turns the identify light of a node off.
    async fn identify_off(&self, node_id: &str) -> Result<Value>;
}

/// Talks to one kind of management controller.
#[async_trait]
pub trait ObmDriver: Send + Sync {
    /// The `service` name this driver handles in a node's OBM settings.
    fn service(&self) -> &str;

    /// Applies `state` to the node using the driver configuration.
    async fn identify(
        &self,
        node_id: &str,
        config: &Map<String, Value>,
        state: IdentifyState,
    ) -> Result<Value>;
}

/// Driver that logs the request and reports success.
#[derive(Debug, Default, Clone)]
pub struct NoopObmDriver;

#[async_trait]
impl ObmDriver for NoopObmDriver {
    fn service(&self) -> &str {
        NOOP_OBM_SERVICE
    }

    async fn identify(
        &self,
        node_id: &str,
        _config: &Map<String, Value>,
        state: IdentifyState,
    ) -> Result<Value> {
        debug!(node = %node_id, ?state, "noop identify");
        Ok(json!({ "node": node_id, "identify": state }))
    }
}

/// Routes OBM requests to the driver named by the node's first OBM setting.
pub struct ObmDispatcher {
    nodes: Arc<dyn NodeRepository>,
    drivers: HashMap<String, Arc<dyn ObmDriver>>,
}

impl ObmDispatcher {
    /// Creates a dispatcher with the noop driver registered.
    pub fn new(nodes: Arc<dyn NodeRepository>) -> Self {
        Self {
            nodes,
            drivers: HashMap::new(),
        }
        .with_driver(Arc::new(NoopObmDriver))
    }

    /// Registers a driver, replacing any driver for the same service.
    pub fn with_driver(mut self, driver: Arc<dyn ObmDriver>) -> Self {
        self.drivers.insert(driver.service().to_string(), driver);
        self
    }

    /// Registered driver names, sorted.
    pub fn services(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    async fn dispatch(&self, node_id: &str, state: IdentifyState) -> Result<Value> {
        let node = self
            .nodes
            .find_by_identifier(node_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("node {}", node_id)))?;

        let setting = node.obm_settings().first().ok_or_else(|| {
            ServiceError::InvalidInput(format!("node {} has no OBM settings", node.id))
        })?;

        let driver = self
            .drivers
            .get(&setting.service)
            .ok_or_else(|| ServiceError::Driver {
                service: setting.service.clone(),
                message: "no driver registered".to_string(),
            })?;

        let result = driver.identify(&node.id, &setting.config, state).await?;
        info!(node = %node.id, service = %setting.service, ?state, "Identify request sent");
        Ok(result)
    }
}

#[async_trait]
impl ObmService for ObmDispatcher {
    async fn identify_on(&self, node_id: &str) -> Result<Value> {
        self.dispatch(node_id, IdentifyState::On).await
    }

    async fn identify_off(&self, node_id: &str) -> Result<Value> {
        self.dispatch(node_id, IdentifyState::Off).await
    }
}
