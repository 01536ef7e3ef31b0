// src/services/extractor.rs

//! Change extractor.
//!
//! Turns a fetched page into an [`Observation`] according to the site's
//! tracking mode: a fingerprint of the selected fragment, or the parsed
//! `Last-Modified` timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Observation, Site, TrackingMode};
use crate::services::FetchedPage;

/// Extract the change signal for `site` from `page`.
pub fn extract(site: &Site, page: &FetchedPage) -> Result<Observation> {
    let mut observation = Observation::for_site(site);

    match site.tracking_mode() {
        TrackingMode::Selector(selector) => {
            let fragment = page
                .select_first(selector)?
                .ok_or_else(|| AppError::selector_miss(&site.url, selector))?;
            observation.content = Some(fragment);
            observation.selector = Some(selector.to_string());
        }
        TrackingMode::Timestamp => {
            let raw = page
                .last_modified
                .as_deref()
                .ok_or_else(|| AppError::MissingLastModified {
                    url: site.url.clone(),
                })?;
            let parsed = parse_http_date(raw).ok_or_else(|| AppError::InvalidLastModified {
                url: site.url.clone(),
                value: raw.to_string(),
            })?;
            observation.last_modified = Some(parsed);
        }
    }

    Ok(observation)
}

/// Parse an HTTP date.
///
/// Accepts the IMF-fixdate form plus the obsolete RFC 850 and asctime forms
/// that HTTP/1.1 recipients must still understand.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    const OBSOLETE_FORMATS: &[&str] = &["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];
    OBSOLETE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
