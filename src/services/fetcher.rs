// src/services/fetcher.rs

//! Page fetcher.
//!
//! Retrieves a page and keeps the body in a form that can be queried with
//! CSS selectors.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::LAST_MODIFIED;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http;

/// A fetched page: response metadata plus the raw document.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// Raw `Last-Modified` header, if the server sent one
    pub last_modified: Option<String>,

    /// Document body
    pub body: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_modified: None,
            body: body.into(),
        }
    }

    pub fn with_last_modified(mut self, value: impl Into<String>) -> Self {
        self.last_modified = Some(value.into());
        self
    }

    /// Serialize the first element matching `selector`, including its own tag.
    pub fn select_first(&self, selector: &str) -> Result<Option<String>> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_document(&self.body);
        Ok(document.select(&parsed).next().map(|el| el.html()))
    }

    /// Text of the document `<title>`, whitespace collapsed.
    pub fn title(&self) -> Option<String> {
        let selector = parse_selector("title").ok()?;
        let document = Html::parse_document(&self.body);
        let text = document.select(&selector).next()?.text().collect::<String>();
        let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!title.is_empty()).then_some(title)
    }
}

/// Source of fetched pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. Every failure is reported as [`AppError::Fetch`].
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Fetcher backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::with_client(http::create_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(url, &e))?;

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| fetch_error(url, &e))?;

        log::debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(FetchedPage {
            url: url.to_string(),
            last_modified,
            body,
        })
    }
}

fn fetch_error(url: &str, error: &reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::fetch(url, "request timed out")
    } else {
        AppError::fetch(url, error)
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
