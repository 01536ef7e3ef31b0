//! In-memory state store for tests and dry runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Baseline, Observation, baseline_from};
use crate::storage::{Lockfile, StateStore};

/// State store that keeps the lockfile in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lockfile: Mutex<Lockfile>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a baseline.
    pub fn with_observations(observations: &[Observation]) -> Self {
        Self {
            lockfile: Mutex::new(Lockfile::new(observations)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Currently stored observations, sorted by URL.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.lock().sites.clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lockfile> {
        self.lockfile.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Baseline> {
        Ok(baseline_from(self.snapshot()))
    }

    async fn save(&self, observations: &[Observation]) -> Result<()> {
        *self.lock() = Lockfile::new(observations);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Site;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());

        let obs = Observation::for_site(&Site::new("A", "http://a.example/"));
        store.save(std::slice::from_ref(&obs)).await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot(), vec![obs]);
    }
}
