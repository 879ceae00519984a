//! # Onrack Services
//!
//! Collaborators the HTTP layer calls through narrow interfaces:
//!
//! - [`TaskGraphRunner`]: start, inspect and cancel task graphs
//! - [`ObmService`]: identify-light control through OBM drivers
//! - [`MessageBus`] and [`MessagingResources`]: resource events
//! - [`FileStore`]: blob storage started at boot
//! - [`CoreServices`]: ordered start/stop of everything with a lifecycle

pub mod bus;
pub mod error;
pub mod file_store;
pub mod lifecycle;
pub mod obm;
pub mod resources;
pub mod task_graph;

pub use bus::{BusEvent, MessageBus};
pub use error::{Result, ServiceError};
pub use file_store::FileStore;
pub use lifecycle::{CoreServices, Service};
pub use obm::{IdentifyState, NoopObmDriver, ObmDispatcher, ObmDriver, ObmService, NOOP_OBM_SERVICE};
pub use resources::{
    MessagingResources, NodeResources, NODE_CREATED, NODE_DELETED, NODE_OBM_IDENTIFY,
    NODE_UPDATED,
};
pub use task_graph::{GraphHandle, GraphTarget, LocalTaskGraphRunner, TaskGraphRunner};
