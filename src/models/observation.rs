// src/models/observation.rs

//! Per-site observations and the baseline they are compared against.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Site;

/// What one run learned about one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    /// Site URL, the identity key
    pub url: String,

    /// Display name, carried through for presentation
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Best estimate of when the content last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Serialized fragment, set only for selector-tracked sites
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Selector in effect when this observation was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl Observation {
    /// Start an observation for a site with nothing extracted yet.
    pub fn for_site(site: &Site) -> Self {
        Self {
            url: site.url.clone(),
            name: site.name.clone(),
            category: site.category.clone(),
            last_modified: None,
            content: None,
            selector: None,
        }
    }

    pub fn is_selector_tracked(&self) -> bool {
        self.selector.is_some()
    }
}

/// The previous run's observations keyed by URL.
pub type Baseline = HashMap<String, Observation>;

/// Build a baseline from a list of observations.
pub fn baseline_from(observations: impl IntoIterator<Item = Observation>) -> Baseline {
    observations
        .into_iter()
        .map(|o| (o.url.clone(), o))
        .collect()
}
