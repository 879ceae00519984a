//! Liveness and readiness endpoints driven by the runner's boot phase.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Where the runner is in its start/stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootPhase {
    /// Start phases are still running.
    Starting,
    /// Every start phase completed.
    Serving,
    /// Shutdown has begun.
    Stopping,
}

impl BootPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Serving,
            2 => Self::Stopping,
            _ => Self::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Serving => 1,
            Self::Stopping => 2,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    phase: BootPhase,
    version: &'static str,
    uptime_seconds: u64,
}

/// Health state shared between the runner and the health routes.
#[derive(Clone)]
pub struct HealthState {
    booted_at: Instant,
    phase: Arc<AtomicU8>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// State in the `starting` phase.
    pub fn new() -> Self {
        Self {
            booted_at: Instant::now(),
            phase: Arc::new(AtomicU8::new(BootPhase::Starting.as_u8())),
        }
    }

    pub fn phase(&self) -> BootPhase {
        BootPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn set_phase(&self, phase: BootPhase) {
        self.phase.store(phase.as_u8(), Ordering::Release);
    }

    /// True only while serving.
    pub fn is_ready(&self) -> bool {
        self.phase() == BootPhase::Serving
    }

    fn body(&self) -> StatusBody {
        StatusBody {
            phase: self.phase(),
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: self.booted_at.elapsed().as_secs(),
        }
    }
}

/// `/health` and `/health/live` answer 200 while the process is up;
/// `/health/ready` answers 503 outside the `serving` phase.
pub fn health_routes<S>(state: HealthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(live))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
        .with_state(state)
}

async fn live(State(state): State<HealthState>) -> impl IntoResponse {
    Json(state.body())
}

async fn ready(State(state): State<HealthState>) -> impl IntoResponse {
    let status = if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(state.body()))
}
