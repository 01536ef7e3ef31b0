// src/models/mod.rs

//! Domain models for the tracker.

mod config;
mod observation;
mod site;
mod status;

// Re-export all public types
pub use config::{Config, CrawlerConfig, PathsConfig, ServerConfig, TrackerConfig};
pub use observation::{Baseline, Observation, baseline_from};
pub use site::{Site, SiteList, TrackingMode};
pub use status::SiteStatus;
