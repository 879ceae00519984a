//! Process bootstrap.
//!
//! Start order: core services, router, messaging resources, HTTP listener,
//! file store. Each phase completes before the next begins. Stop closes the
//! listener, waits for in-flight requests, then stops core services in
//! reverse order.

use crate::api::{create_router, AppState};
use crate::config::Settings;
use crate::health::{BootPhase, HealthState};
use anyhow::Context;
use onrack_services::{
    CoreServices, FileStore, LocalTaskGraphRunner, MessageBus, MessagingResources,
    NodeResources, ObmDispatcher, Service,
};
use onrack_store::{MemoryConfiguration, Repositories};
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// Owns every long-lived component of the process.
pub struct Runner {
    settings: Settings,
    state: AppState,
    core: CoreServices,
    resources: Vec<Arc<dyn MessagingResources>>,
    file_store: Arc<dyn Service>,
    health: HealthState,
    server: Mutex<Option<RunningServer>>,
}

impl Runner {
    /// Wires the in-memory stores and in-process collaborators.
    pub fn new(settings: Settings) -> Self {
        let repos = Repositories::in_memory();
        let configuration = Arc::new(MemoryConfiguration::from_map(settings.to_configuration()));
        let task_graphs = Arc::new(LocalTaskGraphRunner::new(repos.graph_objects.clone()));
        let obm = Arc::new(ObmDispatcher::new(repos.nodes.clone()));
        let bus = Arc::new(MessageBus::new());

        let core = CoreServices::new()
            .with(bus.clone())
            .with(task_graphs.clone());
        let file_store = Arc::new(FileStore::new(settings.file_store_root.clone()));
        let state = AppState::new(repos, configuration, task_graphs, obm, bus);

        Self::from_parts(settings, state, core, file_store)
            .with_resources(Arc::new(NodeResources))
    }

    /// Assembles a runner from explicit parts.
    pub fn from_parts(
        settings: Settings,
        state: AppState,
        core: CoreServices,
        file_store: Arc<dyn Service>,
    ) -> Self {
        Self {
            settings,
            state,
            core,
            resources: Vec::new(),
            file_store,
            health: HealthState::new(),
            server: Mutex::new(None),
        }
    }

    /// Adds a messaging resource registered during start.
    pub fn with_resources(mut self, resource: Arc<dyn MessagingResources>) -> Self {
        self.resources.push(resource);
        self
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Health endpoint state.
    pub fn health(&self) -> &HealthState {
        &self.health
    }

    /// Address the listener is bound to, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.lock().as_ref().map(|s| s.addr)
    }

    /// Address to bind, read from the configuration store.
    fn listen_addr(&self) -> SocketAddr {
        let configuration = &self.state.configuration;
        let ip = configuration
            .get("httpaddr")
            .and_then(|v| v.as_str().and_then(|s| s.parse::<IpAddr>().ok()))
            .unwrap_or(self.settings.httpaddr);
        let port = configuration
            .get("httpport")
            .and_then(|v| v.as_u64())
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(self.settings.httpport);
        SocketAddr::new(ip, port)
    }

    /// Runs every start phase and returns the bound address.
    ///
    /// If a phase after the core services fails, the listener is closed and
    /// the core services are stopped again.
    pub async fn start(&self) -> anyhow::Result<SocketAddr> {
        self.health.set_phase(BootPhase::Starting);
        self.core
            .start()
            .await
            .context("failed to start core services")?;

        match self.start_frontend().await {
            Ok(addr) => {
                self.health.set_phase(BootPhase::Serving);
                info!(addr = %addr, "Onrack started");
                Ok(addr)
            }
            Err(e) => {
                if let Err(stop_err) = self.stop().await {
                    warn!(error = %stop_err, "Cleanup after failed start also failed");
                }
                Err(e)
            }
        }
    }

    async fn start_frontend(&self) -> anyhow::Result<SocketAddr> {
        let router = create_router(self.state.clone(), self.health.clone());

        for resource in &self.resources {
            resource.register(&self.state.bus);
            info!(resource = %resource.name(), "Messaging resource registered");
        }

        let addr = self.listen_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        let local = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });
        *self.server.lock() = Some(RunningServer {
            addr: local,
            shutdown,
            task,
        });
        info!(addr = %local, "HTTP listener bound");

        self.file_store
            .start()
            .await
            .context("failed to start file store")?;

        Ok(local)
    }

    /// Closes the listener, then stops core services in reverse order.
    ///
    /// Core services are stopped even when the server task failed; the first
    /// error is returned.
    pub async fn stop(&self) -> anyhow::Result<()> {
        self.health.set_phase(BootPhase::Stopping);

        let server = self.server.lock().take();
        let server_result = match server {
            Some(server) => {
                let _ = server.shutdown.send(());
                let result = match server.task.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(anyhow::Error::new(e).context("HTTP server failed")),
                    Err(e) => Err(anyhow::Error::new(e).context("HTTP server task panicked")),
                };
                info!(addr = %server.addr, "HTTP listener closed");
                result
            }
            None => Ok(()),
        };

        let core_result = self
            .core
            .stop()
            .await
            .context("failed to stop core services");

        if let Err(e) = &server_result {
            warn!(error = %e, "HTTP server ended with an error");
        }
        server_result.and(core_result)?;
        info!("Onrack stopped");
        Ok(())
    }
}
