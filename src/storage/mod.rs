//! Storage abstractions for the persisted baseline.
//!
//! The baseline lives in a lockfile next to the site list:
//!
//! ```text
//! storage/
//! ├── config.toml        # Tracker configuration
//! ├── sites.toml         # Tracked sites
//! └── sites.lock.json    # Observations from the last run
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Baseline, Observation};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// On-disk layout of the lockfile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lockfile {
    #[serde(default)]
    pub sites: Vec<Observation>,
}

impl Lockfile {
    /// Build a lockfile with entries sorted by URL so output is stable.
    pub fn new(observations: &[Observation]) -> Self {
        let mut sites = observations.to_vec();
        sites.sort_by(|a, b| a.url.cmp(&b.url));
        Self { sites }
    }
}

/// Durable URL → observation mapping.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the baseline. A store that does not exist yet is empty.
    async fn load(&self) -> Result<Baseline>;

    /// Replace the stored baseline atomically.
    async fn save(&self, observations: &[Observation]) -> Result<()>;

    /// Drop one URL from the store. Returns whether it was present.
    async fn remove(&self, url: &str) -> Result<bool> {
        let mut baseline = self.load().await?;
        let key = baseline
            .keys()
            .find(|key| crate::utils::url::same_url(key, url))
            .cloned();
        match key {
            Some(key) => {
                baseline.remove(&key);
                let remaining: Vec<Observation> = baseline.into_values().collect();
                self.save(&remaining).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
