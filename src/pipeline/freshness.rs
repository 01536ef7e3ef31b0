//! Freshness classification.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Observation, SiteStatus};

/// Whether a change at `last_modified` is still inside the expiration window.
pub fn is_new(last_modified: Option<DateTime<Utc>>, expiration: Duration, now: DateTime<Utc>) -> bool {
    last_modified.is_some_and(|ts| ts > now - expiration)
}

/// Flag each observation as new or not, keeping only presentation fields.
pub fn classify(
    observations: &[Observation],
    expiration: Duration,
    now: DateTime<Utc>,
) -> Vec<SiteStatus> {
    observations
        .iter()
        .map(|o| SiteStatus {
            name: o.name.clone(),
            url: o.url.clone(),
            category: o.category.clone(),
            is_new: is_new(o.last_modified, expiration, now),
            last_modified: o.last_modified,
        })
        .collect()
}
