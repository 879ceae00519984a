//! # Onrack Store
//!
//! Persistence façades for inventory records.
//!
//! The HTTP layer only ever talks to the traits in [`traits`]; the in-memory
//! implementations here back a standalone server and the test suites.
//!
//! ## Usage
//!
//! ```rust
//! use onrack_store::{NodeRepository, Repositories};
//! use onrack_types::Node;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let repos = Repositories::in_memory();
//! let node = repos.nodes.create(Node::new("abc")).await.unwrap();
//! assert_eq!(repos.nodes.find_by_identifier("abc").await.unwrap(), Some(node));
//! # }
//! ```

pub mod catalog;
pub mod configuration;
pub mod error;
pub mod graph;
pub mod node;
pub mod traits;
pub mod work_item;

pub use catalog::MemoryCatalogRepository;
pub use configuration::MemoryConfiguration;
pub use error::{Result, StoreError};
pub use graph::MemoryGraphObjectRepository;
pub use node::MemoryNodeRepository;
pub use traits::{
    CatalogRepository, ConfigurationStore, GraphObjectQuery, GraphObjectRepository,
    NodeRepository, NodeWithCatalogs, NodeWithWorkflows, WorkItemFilter, WorkItemRepository,
};
pub use work_item::MemoryWorkItemRepository;

use std::sync::Arc;

/// The four inventory repositories, shared behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    /// Node repository.
    pub nodes: Arc<dyn NodeRepository>,
    /// Catalog repository.
    pub catalogs: Arc<dyn CatalogRepository>,
    /// Work item repository.
    pub work_items: Arc<dyn WorkItemRepository>,
    /// Graph object repository.
    pub graph_objects: Arc<dyn GraphObjectRepository>,
}

impl Repositories {
    /// Builds a set of joined in-memory repositories.
    pub fn in_memory() -> Self {
        let catalogs: Arc<dyn CatalogRepository> = Arc::new(MemoryCatalogRepository::new());
        let graph_objects: Arc<dyn GraphObjectRepository> =
            Arc::new(MemoryGraphObjectRepository::new());
        let nodes = Arc::new(MemoryNodeRepository::new(
            catalogs.clone(),
            graph_objects.clone(),
        ));

        Self {
            nodes,
            catalogs,
            work_items: Arc::new(MemoryWorkItemRepository::new()),
            graph_objects,
        }
    }
}
