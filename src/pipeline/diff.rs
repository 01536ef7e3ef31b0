//! Reconciliation of fresh observations against the baseline.
//!
//! Decides each site's effective "last changed" instant:
//!
//! - selector-tracked on both sides: a content change stamps `now`, equal
//!   content carries the baseline timestamp forward;
//! - timestamp-tracked on both sides: the fresh header wins, and a missing
//!   one falls back to the baseline timestamp;
//! - anything else (first sighting, tracking mode switched): the site is
//!   stamped `now - expiration` so it does not show up as new.
//!
//! Baseline entries without a fresh counterpart are dropped.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Baseline, Observation};

/// Result of reconciling one run.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// The new baseline to persist
    pub observations: Vec<Observation>,
    /// URLs whose selected content changed since the baseline
    pub changed: Vec<String>,
    /// URLs with no usable baseline, stamped as already stale
    pub first_seen: Vec<String>,
    /// Baseline URLs absent from this run
    pub dropped: Vec<String>,
}

impl Reconciliation {
    /// Check if any tracked content changed.
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Merge `fresh` observations into a new baseline.
pub fn reconcile(
    baseline: &Baseline,
    fresh: Vec<Observation>,
    expiration: Duration,
    now: DateTime<Utc>,
) -> Reconciliation {
    let stale = now - expiration;
    let mut result = Reconciliation::default();

    result.dropped = {
        let fresh_urls: HashSet<&str> = fresh.iter().map(|o| o.url.as_str()).collect();
        let mut dropped: Vec<String> = baseline
            .keys()
            .filter(|url| !fresh_urls.contains(url.as_str()))
            .cloned()
            .collect();
        dropped.sort();
        dropped
    };

    for mut observation in fresh {
        if !observation.is_selector_tracked() {
            observation.content = None;
        }

        match baseline.get(&observation.url) {
            Some(prior) if observation.is_selector_tracked() && prior.is_selector_tracked() => {
                if observation.content != prior.content {
                    log::debug!("{}: content changed", observation.url);
                    observation.last_modified = Some(now);
                    result.changed.push(observation.url.clone());
                } else {
                    observation.last_modified = prior.last_modified;
                }
            }
            Some(prior) if !observation.is_selector_tracked() && !prior.is_selector_tracked() => {
                match (observation.last_modified, prior.last_modified) {
                    (Some(fresh_ts), Some(prior_ts)) if fresh_ts < prior_ts => {
                        log::warn!(
                            "{}: last-modified went backwards ({} < {})",
                            observation.url,
                            fresh_ts.to_rfc3339(),
                            prior_ts.to_rfc3339()
                        );
                    }
                    (None, prior_ts) => observation.last_modified = prior_ts,
                    _ => {}
                }
            }
            Some(_) => log::debug!("{}: tracking mode changed", observation.url),
            None => log::debug!("{}: first sighting", observation.url),
        }

        if observation.last_modified.is_none() {
            observation.last_modified = Some(stale);
            result.first_seen.push(observation.url.clone());
        }

        result.observations.push(observation);
    }

    if !result.dropped.is_empty() {
        log::info!(
            "Dropping {} baseline entries not observed this run",
            result.dropped.len()
        );
    }

    result
}
