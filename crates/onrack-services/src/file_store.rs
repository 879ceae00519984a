//! File store root directory, prepared during bootstrap.

use crate::error::Result;
use crate::lifecycle::Service;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

const SCRATCH_FILE: &str = ".onrack-write-check";

/// Owns the directory that holds uploaded files.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    started: AtomicBool,
}

impl FileStore {
    /// Creates a store rooted at `root`. Nothing touches disk until `start`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            started: AtomicBool::new(false),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `start` has completed.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for FileStore {
    fn name(&self) -> &str {
        "file-store"
    }

    /// Creates the root directory and checks that it is writable.
    async fn start(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let scratch = self.root.join(SCRATCH_FILE);
        tokio::fs::write(&scratch, b"ok").await?;
        tokio::fs::remove_file(&scratch).await?;

        self.started.store(true, Ordering::SeqCst);
        info!(root = %self.root.display(), "File store started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.started.store(false, Ordering::SeqCst);
        Ok(())
    }
}
