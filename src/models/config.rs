//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Change detection settings
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// File locations, relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,

    /// Page server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_ms == 0 {
            return Err(AppError::validation("crawler.timeout_ms must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.tracker.expiration_days == 0 {
            return Err(AppError::validation("tracker.expiration_days must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-site fetch timeout in milliseconds
    #[serde(default = "defaults::timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum concurrent fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_ms: defaults::timeout_ms(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Days a detected change stays "new"
    #[serde(default = "defaults::expiration_days")]
    pub expiration_days: u32,
}

impl TrackerConfig {
    pub fn expiration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiration_days))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            expiration_days: defaults::expiration_days(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Tracked site list
    #[serde(default = "defaults::sites_file")]
    pub sites_file: String,

    /// Persisted observations from the last run
    #[serde(default = "defaults::lockfile")]
    pub lockfile: String,

    /// Rendered page written by `build`
    #[serde(default = "defaults::output_file")]
    pub output_file: String,
}

impl PathsConfig {
    pub fn sites_path(&self, base: &Path) -> PathBuf {
        base.join(&self.sites_file)
    }

    pub fn lockfile_path(&self, base: &Path) -> PathBuf {
        base.join(&self.lockfile)
    }

    pub fn output_path(&self, base: &Path) -> PathBuf {
        base.join(&self.output_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sites_file: defaults::sites_file(),
            lockfile: defaults::lockfile(),
            output_file: defaults::output_file(),
        }
    }
}

/// Page server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_8_5) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/31.0.1650.63 Safari/537.36"
            .into()
    }
    pub fn timeout_ms() -> u64 {
        5000
    }
    pub fn max_concurrent() -> usize {
        10
    }

    // Tracker defaults
    pub fn expiration_days() -> u32 {
        30
    }

    // Path defaults
    pub fn sites_file() -> String {
        "sites.toml".into()
    }
    pub fn lockfile() -> String {
        "sites.lock.json".into()
    }
    pub fn output_file() -> String {
        "newwork.html".into()
    }

    // Server defaults
    pub fn port() -> u16 {
        3030
    }
}
