// src/error.rs

//! Unified error handling for the tracker.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error outside of a site fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Network, DNS, TLS, timeout or non-success status while fetching a site
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The configured selector matched nothing on the page
    #[error("{url}: selector '{selector}' matched no elements, check the site's selector")]
    SelectorMiss { url: String, selector: String },

    /// Timestamp tracking was chosen but the server sent no Last-Modified header
    #[error("{url}: no 'last-modified' header, specify a selector")]
    MissingLastModified { url: String },

    /// The server sent a Last-Modified header that could not be parsed
    #[error("{url}: unparseable 'last-modified' header '{value}', specify a selector")]
    InvalidLastModified { url: String, value: String },

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// State store exists but could not be read or parsed
    #[error("Cannot read state store {path}: {message}")]
    StoreRead { path: String, message: String },

    /// State store could not be written
    #[error("Cannot write state store {path}: {message}")]
    StoreWrite { path: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Site is not in the tracked list
    #[error("Site {0} not found")]
    SiteNotFound(String),

    /// Site is already in the tracked list
    #[error("Site {0} is already tracked")]
    DuplicateSite(String),
}

impl AppError {
    /// Create a fetch error for a site.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector-miss error for a site.
    pub fn selector_miss(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::SelectorMiss {
            url: url.into(),
            selector: selector.into(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    pub fn store_read(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::StoreRead {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    pub fn store_write(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::StoreWrite {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error belongs to a single site and must not abort a run.
    pub fn is_site_level(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::SelectorMiss { .. }
                | Self::MissingLastModified { .. }
                | Self::InvalidLastModified { .. }
                | Self::Selector { .. }
        )
    }

    /// Short stable label used when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Http(_) => "http",
            Self::Json(_) => "json",
            Self::Toml(_) | Self::TomlSerialize(_) => "toml",
            Self::Url(_) => "url",
            Self::Fetch { .. } => "fetch",
            Self::SelectorMiss { .. } => "selector-miss",
            Self::MissingLastModified { .. } => "missing-last-modified",
            Self::InvalidLastModified { .. } => "invalid-last-modified",
            Self::Selector { .. } => "invalid-selector",
            Self::StoreRead { .. } => "store-read",
            Self::StoreWrite { .. } => "store-write",
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::SiteNotFound(_) => "site-not-found",
            Self::DuplicateSite(_) => "duplicate-site",
        }
    }
}
