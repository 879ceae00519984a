//! Ordered start/stop of core services.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// A long-lived component with an explicit lifecycle.
#[async_trait]
pub trait Service: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Starts the service.
    async fn start(&self) -> Result<()>;

    /// Stops the service.
    async fn stop(&self) -> Result<()>;
}

/// Core services, started in registration order and stopped in reverse.
#[derive(Default, Clone)]
pub struct CoreServices {
    services: Vec<Arc<dyn Service>>,
}

impl CoreServices {
    /// Creates an empty service set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a service.
    pub fn with(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    /// Registered service names in start order.
    pub fn names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name().to_string()).collect()
    }

    /// Starts every service in order.
    ///
    /// If one fails, the services already started are stopped again in
    /// reverse order and the original error is returned.
    pub async fn start(&self) -> Result<()> {
        for (index, service) in self.services.iter().enumerate() {
            if let Err(e) = service.start().await {
                warn!(service = %service.name(), error = %e, "Service failed to start");
                for started in self.services[..index].iter().rev() {
                    if let Err(stop_err) = started.stop().await {
                        warn!(service = %started.name(), error = %stop_err, "Rollback stop failed");
                    }
                }
                return Err(e);
            }
            info!(service = %service.name(), "Service started");
        }
        Ok(())
    }

    /// Stops every service in reverse order.
    ///
    /// All services are asked to stop even if one fails; the first error is
    /// returned.
    pub async fn stop(&self) -> Result<()> {
        let mut first_error = None;
        for service in self.services.iter().rev() {
            match service.stop().await {
                Ok(()) => info!(service = %service.name(), "Service stopped"),
                Err(e) => {
                    warn!(service = %service.name(), error = %e, "Service failed to stop");
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
