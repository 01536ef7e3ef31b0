//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Observation, Site};
use crate::pipeline::{CrawlOutcome, SiteCrawler, SiteFailure};
use crate::services::{FetchedPage, PageFetcher};

/// Map-backed fetcher. Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str, last_modified: Option<&str>) -> Self {
        let mut page = FetchedPage::new(url, body);
        page.last_modified = last_modified.map(str::to_string);
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "connection refused"))
    }
}

/// Crawler that replays canned observations, keyed by URL.
/// Sites without a canned observation fail with a fetch error.
#[derive(Default)]
pub struct StaticCrawler {
    observations: HashMap<String, Observation>,
}

impl StaticCrawler {
    pub fn new(observations: impl IntoIterator<Item = Observation>) -> Self {
        Self {
            observations: observations
                .into_iter()
                .map(|o| (o.url.clone(), o))
                .collect(),
        }
    }
}

#[async_trait]
impl SiteCrawler for StaticCrawler {
    async fn crawl(&self, sites: &[Site]) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        for site in sites {
            match self.observations.get(&site.url) {
                Some(observation) => outcome.observations.push(observation.clone()),
                None => outcome.failures.push(SiteFailure {
                    site: site.clone(),
                    error: AppError::fetch(&site.url, "timed out after 5000 ms"),
                }),
            }
        }
        outcome
    }
}

/// Observation for a selector-tracked site with the given content.
pub fn selector_observation(site: &Site, content: &str) -> Observation {
    let mut observation = Observation::for_site(site);
    observation.selector = site.selector.clone();
    observation.content = Some(content.to_string());
    observation
}
