// src/pipeline/crawl.rs

//! Crawl orchestration.
//!
//! Runs fetch + extract for every site with bounded concurrency. A failing
//! site is recorded in the outcome and never stops its siblings.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Observation, Site};
use crate::services::{PageFetcher, extract};

/// A site that could not be observed this run.
#[derive(Debug)]
pub struct SiteFailure {
    pub site: Site,
    pub error: AppError,
}

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Successful observations, in completion order
    pub observations: Vec<Observation>,
    /// Sites that failed, each with its own error
    pub failures: Vec<SiteFailure>,
}

impl CrawlOutcome {
    pub fn site_total(&self) -> usize {
        self.observations.len() + self.failures.len()
    }
}

/// Produces fresh observations for a list of sites.
#[async_trait]
pub trait SiteCrawler: Send + Sync {
    async fn crawl(&self, sites: &[Site]) -> CrawlOutcome;
}

/// Default crawler: a [`PageFetcher`] followed by [`extract`].
pub struct Crawler<F> {
    fetcher: F,
    max_concurrent: usize,
    timeout: Duration,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            max_concurrent: config.max_concurrent.max(1),
            timeout: config.timeout(),
        }
    }

    /// Fetch and extract a single site under the per-site deadline.
    async fn scrape(&self, site: &Site) -> Result<Observation> {
        let page = tokio::time::timeout(self.timeout, self.fetcher.fetch(&site.url))
            .await
            .map_err(|_| {
                AppError::fetch(
                    &site.url,
                    format!("timed out after {} ms", self.timeout.as_millis()),
                )
            })??;
        extract(site, &page)
    }
}

#[async_trait]
impl<F: PageFetcher> SiteCrawler for Crawler<F> {
    async fn crawl(&self, sites: &[Site]) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();

        let mut site_stream = stream::iter(sites.iter().cloned())
            .map(|site| async move {
                let result = self.scrape(&site).await;
                (site, result)
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((site, result)) = site_stream.next().await {
            match result {
                Ok(observation) => {
                    log::debug!("Observed {}", site.url);
                    outcome.observations.push(observation);
                }
                Err(error) => {
                    if error.is_site_level() {
                        log::warn!("[{}] {} ({}): {}", error.kind(), site.name, site.url, error);
                    } else {
                        log::error!("[{}] {} ({}): {}", error.kind(), site.name, site.url, error);
                    }
                    outcome.failures.push(SiteFailure { site, error });
                }
            }
        }

        log::info!(
            "Crawled {} sites: {} observed, {} failed",
            outcome.site_total(),
            outcome.observations.len(),
            outcome.failures.len()
        );

        outcome
    }
}
