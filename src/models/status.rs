// src/models/status.rs

//! Classified site status handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A site with its freshness flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteStatus {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_new: bool,
    pub last_modified: Option<DateTime<Utc>>,
}
