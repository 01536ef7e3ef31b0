// src/models/site.rs

//! Tracked sites and the site list file.

use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::fs::write_atomic;
use crate::utils::url::{normalize_url, same_url};

/// A tracked web page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    /// Display name
    pub name: String,

    /// Canonical identity of the site
    pub url: String,

    /// Optional grouping label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// CSS selector for the fragment to fingerprint.
    /// When absent the site is tracked by its `Last-Modified` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// How a site's changes are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode<'a> {
    /// Fingerprint the first element matching the selector
    Selector(&'a str),
    /// Use the server-supplied modification timestamp
    Timestamp,
}

impl Site {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: None,
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Resolve the tracking mode. An empty selector counts as none.
    pub fn tracking_mode(&self) -> TrackingMode<'_> {
        match self.selector.as_deref().map(str::trim) {
            Some(selector) if !selector.is_empty() => TrackingMode::Selector(selector),
            _ => TrackingMode::Timestamp,
        }
    }

    /// Check the URL is absolute http(s) and the selector parses.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "{}: unsupported scheme '{}'",
                self.url,
                parsed.scheme()
            )));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::validation(format!("{}: name is empty", self.url)));
        }
        if let TrackingMode::Selector(selector) = self.tracking_mode() {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }
}

/// The site list file (`sites.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteList {
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl SiteList {
    /// Load the site list. A missing file is an empty list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the site list atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        write_atomic(path.as_ref(), text.as_bytes())
    }

    pub fn find(&self, url: &str) -> Option<&Site> {
        self.sites.iter().find(|s| same_url(&s.url, url))
    }

    /// Add a site, keeping the list sorted by name.
    pub fn add(&mut self, mut site: Site) -> Result<()> {
        site.url = normalize_url(&site.url)?;
        if self.find(&site.url).is_some() {
            return Err(AppError::DuplicateSite(site.url));
        }
        self.sites.push(site);
        self.sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }

    /// Remove a site by URL and return it.
    pub fn remove(&mut self, url: &str) -> Result<Site> {
        let index = self
            .sites
            .iter()
            .position(|s| same_url(&s.url, url))
            .ok_or_else(|| AppError::SiteNotFound(url.to_string()))?;
        Ok(self.sites.remove(index))
    }

    pub fn validate(&self) -> Result<()> {
        for site in &self.sites {
            site.validate()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
