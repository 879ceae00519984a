//! # Onrack Server
//!
//! HTTP surface of the node inventory service.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────┐
//! │ Router (/api/1.1, /api/common)               │
//! │  nodes_api · workflow_api · dhcp_api         │
//! └──────────────────────────────────────────────┘
//!     │                 │                  │
//!     ▼                 ▼                  ▼
//!  Repositories   TaskGraphRunner   ObmService / ConfigurationStore
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Application state and router assembly
//! - [`nodes_api`] - Node CRUD, OBM settings, catalogs and pollers
//! - [`workflow_api`] - Task-graph runs against a node
//! - [`dhcp_api`] - DHCP whitelist maintenance
//! - [`config`] - Layered settings
//! - [`runner`] - Ordered start and stop of the process
//! - [`observability`] - Logging, metrics and request ids
//! - [`health`] - Liveness and readiness endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use onrack_server::{config::Settings, runner::Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let runner = Runner::new(Settings::default());
//! let addr = runner.start().await?;
//! println!("listening on {}", addr);
//! runner.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod dhcp_api;
pub mod error;
pub mod health;
pub mod nodes_api;
pub mod observability;
pub mod runner;
pub mod validation;
pub mod workflow_api;
