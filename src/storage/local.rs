//! Local filesystem state store.
//!
//! Keeps the baseline in a JSON lockfile. Writes go to a sibling temp file
//! that is renamed over the lockfile, so a crash mid-write leaves the
//! previous baseline intact.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Baseline, Observation, baseline_from};
use crate::storage::{Lockfile, StateStore};

/// JSON lockfile backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the lockfile at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create an empty lockfile if none exists yet.
    pub async fn init(&self) -> Result<()> {
        if self.read_bytes().await?.is_none() {
            self.write_lockfile(&Lockfile::default()).await?;
            log::info!("Created empty lockfile at {}", self.path.display());
        }
        Ok(())
    }

    /// Read the lockfile bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::store_read(self.path.display(), e)),
        }
    }

    /// Read and parse the lockfile.
    pub async fn read_lockfile(&self) -> Result<Option<Lockfile>> {
        match self.read_bytes().await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::store_read(self.path.display(), e)),
            None => Ok(None),
        }
    }

    async fn write_lockfile(&self, lockfile: &Lockfile) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(lockfile)?;
        bytes.push(b'\n');
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::store_write(self.path.display(), e))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl StateStore for LocalStore {
    async fn load(&self) -> Result<Baseline> {
        match self.read_lockfile().await? {
            Some(lockfile) => {
                log::debug!(
                    "Loaded {} baseline entries from {}",
                    lockfile.sites.len(),
                    self.path.display()
                );
                Ok(baseline_from(lockfile.sites))
            }
            None => {
                log::warn!("No lockfile at {}, starting fresh", self.path.display());
                Ok(Baseline::new())
            }
        }
    }

    async fn save(&self, observations: &[Observation]) -> Result<()> {
        self.write_lockfile(&Lockfile::new(observations)).await?;
        log::info!(
            "Saved {} observations to {}",
            observations.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
