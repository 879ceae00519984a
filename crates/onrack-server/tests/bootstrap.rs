//! Start and stop sequencing of the runner over a real listener.

use async_trait::async_trait;
use onrack_server::api::AppState;
use onrack_server::config::Settings;
use onrack_server::runner::Runner;
use onrack_services::{
    CoreServices, LocalTaskGraphRunner, MessageBus, MessagingResources, ObmDispatcher, Service,
    ServiceError,
};
use onrack_store::{MemoryConfiguration, Repositories};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

type Log = Arc<Mutex<Vec<String>>>;

struct RecordingService {
    name: &'static str,
    log: Log,
    fail_start: bool,
}

#[async_trait]
impl Service for RecordingService {
    fn name(&self) -> &str {
        self.name
    }

    async fn start(&self) -> onrack_services::Result<()> {
        self.log.lock().push(format!("{}:start", self.name));
        if self.fail_start {
            return Err(ServiceError::Unavailable(self.name.to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> onrack_services::Result<()> {
        self.log.lock().push(format!("{}:stop", self.name));
        Ok(())
    }
}

struct RecordingResources {
    log: Log,
}

impl MessagingResources for RecordingResources {
    fn name(&self) -> &str {
        "recording"
    }

    fn register(&self, bus: &MessageBus) {
        bus.register_topic("recording.event");
        self.log.lock().push("resources:register".to_string());
    }
}

fn local_settings() -> Settings {
    Settings {
        httpaddr: IpAddr::from([127, 0, 0, 1]),
        httpport: 0,
        ..Settings::default()
    }
}

fn recording_runner(log: &Log, fail_file_store: bool) -> Runner {
    let settings = local_settings();
    let repos = Repositories::in_memory();
    let state = AppState::new(
        repos.clone(),
        Arc::new(MemoryConfiguration::from_map(settings.to_configuration())),
        Arc::new(LocalTaskGraphRunner::new(repos.graph_objects.clone())),
        Arc::new(ObmDispatcher::new(repos.nodes.clone())),
        Arc::new(MessageBus::new()),
    );
    let core = CoreServices::new().with(Arc::new(RecordingService {
        name: "core",
        log: log.clone(),
        fail_start: false,
    }));
    let file_store = Arc::new(RecordingService {
        name: "files",
        log: log.clone(),
        fail_start: fail_file_store,
    });

    Runner::from_parts(settings, state, core, file_store)
        .with_resources(Arc::new(RecordingResources { log: log.clone() }))
}

/// Sends a bare HTTP/1.1 GET and returns the status line.
async fn http_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response.lines().next().unwrap_or_default().to_string()
}

#[tokio::test]
async fn starts_and_stops_in_order() {
    let log: Log = Arc::default();
    let runner = recording_runner(&log, false);

    let addr = runner.start().await.unwrap();
    assert_eq!(runner.local_addr(), Some(addr));
    assert_ne!(addr.port(), 0);
    assert!(runner.health().is_ready());
    assert_eq!(
        *log.lock(),
        vec!["core:start", "resources:register", "files:start"]
    );
    assert!(runner.state().bus.topics().contains(&"recording.event".to_string()));

    assert_eq!(http_get(addr, "/health/ready").await, "HTTP/1.1 200 OK");
    assert_eq!(http_get(addr, "/api/1.1/nodes").await, "HTTP/1.1 200 OK");

    runner.stop().await.unwrap();
    assert!(!runner.health().is_ready());
    assert_eq!(runner.local_addr(), None);
    assert_eq!(log.lock().last().map(String::as_str), Some("core:stop"));
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn failed_start_rolls_back() {
    let log: Log = Arc::default();
    let runner = recording_runner(&log, true);

    assert!(runner.start().await.is_err());
    assert!(!runner.health().is_ready());
    assert_eq!(runner.local_addr(), None);
    assert_eq!(
        *log.lock(),
        vec!["core:start", "resources:register", "files:start", "core:stop"]
    );
}

#[tokio::test]
async fn default_wiring_serves_api() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("files");
    let runner = Runner::new(Settings {
        file_store_root: root.clone(),
        ..local_settings()
    });

    let addr = runner.start().await.unwrap();
    assert!(root.is_dir());
    assert_eq!(http_get(addr, "/api/common/nodes").await, "HTTP/1.1 200 OK");
    assert_eq!(
        http_get(addr, "/api/1.1/nodes/123").await,
        "HTTP/1.1 404 Not Found"
    );

    runner.stop().await.unwrap();
}
