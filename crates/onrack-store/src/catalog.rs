//! In-memory catalog repository.

use crate::error::Result;
use crate::traits::CatalogRepository;
use async_trait::async_trait;
use onrack_types::{new_record_id, Catalog};
use parking_lot::RwLock;

/// Catalog store kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryCatalogRepository {
    catalogs: RwLock<Vec<Catalog>>,
}

impl MemoryCatalogRepository {
    /// Creates an empty catalog store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn create(&self, mut catalog: Catalog) -> Result<Catalog> {
        if catalog.id.is_empty() {
            catalog.id = new_record_id();
        }
        self.catalogs.write().push(catalog.clone());
        Ok(catalog)
    }

    async fn find_by_node(&self, node: &str) -> Result<Vec<Catalog>> {
        Ok(self
            .catalogs
            .read()
            .iter()
            .filter(|c| c.node == node)
            .cloned()
            .collect())
    }

    async fn find_latest_catalog_of_source(
        &self,
        node: &str,
        source: &str,
    ) -> Result<Option<Catalog>> {
        // max_by_key keeps the last of equal keys, so later inserts win ties.
        Ok(self
            .catalogs
            .read()
            .iter()
            .filter(|c| c.node == node && c.source == source)
            .max_by_key(|c| c.created_at)
            .cloned())
    }
}
