// src/pipeline/status.rs

//! One tracker run: load baseline, crawl, reconcile, persist, classify.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::models::{Config, Site, SiteStatus};
use crate::pipeline::{Crawler, SiteCrawler, SiteFailure, classify, reconcile};
use crate::services::HttpFetcher;
use crate::storage::{LocalStore, StateStore};
use crate::view::View;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of a tracker run.
#[derive(Debug, Default)]
pub struct StatusReport {
    /// Classified sites, in site-list order
    pub sites: Vec<SiteStatus>,
    /// Sites that could not be observed this run
    pub failures: Vec<SiteFailure>,
    /// URLs whose content changed this run
    pub changed: Vec<String>,
    /// URLs seen without a usable baseline
    pub first_seen: Vec<String>,
    /// Baseline URLs dropped this run
    pub dropped: Vec<String>,
}

impl StatusReport {
    pub fn new_count(&self) -> usize {
        self.sites.iter().filter(|s| s.is_new).count()
    }
}

/// Runs the change-detection pipeline against a crawler and a state store.
pub struct Tracker {
    crawler: Box<dyn SiteCrawler>,
    store: Box<dyn StateStore>,
    expiration: Duration,
    clock: Clock,
}

impl Tracker {
    pub fn new(
        crawler: impl SiteCrawler + 'static,
        store: impl StateStore + 'static,
        expiration: Duration,
    ) -> Self {
        Self {
            crawler: Box::new(crawler),
            store: Box::new(store),
            expiration,
            clock: Box::new(Utc::now),
        }
    }

    /// Production tracker: HTTP crawler and the lockfile under `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.crawler)?;
        let crawler = Crawler::new(fetcher, &config.crawler);
        let store = LocalStore::new(config.paths.lockfile_path(base_dir));
        Ok(Self::new(crawler, store, config.tracker.expiration()))
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Crawl all sites and report which ones have new work.
    ///
    /// Store errors abort the run. Per-site errors are returned in
    /// [`StatusReport::failures`].
    pub async fn status(&self, sites: &[Site]) -> Result<StatusReport> {
        let baseline = self.store.load().await?;
        log::info!(
            "Loaded baseline of {} sites from {}",
            baseline.len(),
            self.store.location()
        );

        let outcome = self.crawler.crawl(sites).await;
        let now = (self.clock)();

        let reconciliation = reconcile(&baseline, outcome.observations, self.expiration, now);
        self.store.save(&reconciliation.observations).await?;

        let order: HashMap<&str, usize> = sites
            .iter()
            .enumerate()
            .map(|(i, s)| (s.url.as_str(), i))
            .collect();
        let mut statuses = classify(&reconciliation.observations, self.expiration, now);
        statuses.sort_by_key(|s| order.get(s.url.as_str()).copied().unwrap_or(usize::MAX));

        let report = StatusReport {
            sites: statuses,
            failures: outcome.failures,
            changed: reconciliation.changed,
            first_seen: reconciliation.first_seen,
            dropped: reconciliation.dropped,
        };

        log::info!(
            "{} new, {} changed, {} first seen, {} failed",
            report.new_count(),
            report.changed.len(),
            report.first_seen.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Run [`Tracker::status`] and render the result.
    pub async fn render(&self, sites: &[Site], view: &dyn View) -> Result<(String, StatusReport)> {
        let report = self.status(sites).await?;
        let page = view.render(&report.sites);
        Ok((page, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::error::AppError;
    use crate::models::{Baseline, Observation};
    use crate::storage::MemoryStore;
    use crate::testing::{MockFetcher, StaticCrawler, selector_observation};
    use crate::view::HtmlView;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn month() -> Duration {
        Duration::days(30)
    }

    fn stamped(site: &Site, ts: DateTime<Utc>) -> Observation {
        let mut o = Observation::for_site(site);
        o.last_modified = Some(ts);
        o
    }

    /// Store that refuses every operation.
    struct BrokenStore;

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn load(&self) -> Result<Baseline> {
            Err(AppError::store_read("broken", "unexpected end of file"))
        }
        async fn save(&self, _: &[Observation]) -> Result<()> {
            Err(AppError::store_write("broken", "read-only"))
        }
        fn location(&self) -> String {
            "broken".into()
        }
    }

    /// Wrapper that shares a MemoryStore across trackers.
    struct Shared(Arc<MemoryStore>);

    #[async_trait]
    impl StateStore for Shared {
        async fn load(&self) -> Result<Baseline> {
            self.0.load().await
        }
        async fn save(&self, observations: &[Observation]) -> Result<()> {
            self.0.save(observations).await
        }
        fn location(&self) -> String {
            self.0.location()
        }
    }

    #[tokio::test]
    async fn test_old_and_new_sites() {
        let old = Site::new("Old Example", "http://oldexample.com/");
        let new = Site::new("New Example", "http://newexample.com/");
        let store = MemoryStore::with_observations(&[
            stamped(&old, t0() - Duration::days(40)),
            stamped(&new, t0() - Duration::days(1)),
        ]);
        let crawler = StaticCrawler::new(vec![
            Observation::for_site(&old),
            Observation::for_site(&new),
        ]);

        let tracker = Tracker::new(crawler, store, month()).with_clock(t0);
        let report = tracker.status(&[old.clone(), new.clone()]).await.unwrap();

        assert_eq!(report.sites[0].url, old.url);
        assert!(!report.sites[0].is_new);
        assert_eq!(report.sites[0].last_modified, Some(t0() - Duration::days(40)));
        assert!(report.sites[1].is_new);
    }

    #[tokio::test]
    async fn test_fresh_last_modified_is_new() {
        let site = Site::new("Old Example", "http://oldexample.com/");
        let store = MemoryStore::with_observations(&[stamped(&site, t0() - Duration::days(40))]);
        let crawler = StaticCrawler::new(vec![stamped(&site, t0())]);

        let tracker = Tracker::new(crawler, store, month()).with_clock(t0);
        let report = tracker.status(std::slice::from_ref(&site)).await.unwrap();
        assert!(report.sites[0].is_new);
    }

    #[tokio::test]
    async fn test_selector_change_is_new() {
        let site = Site::new("Studio", "http://studio.example/").with_selector(".latest");
        let mut prior = selector_observation(&site, "v1");
        prior.last_modified = Some(t0() - Duration::days(60));

        let store = Arc::new(MemoryStore::with_observations(&[prior]));
        let crawler = StaticCrawler::new(vec![selector_observation(&site, "v2")]);

        let tracker = Tracker::new(crawler, Shared(Arc::clone(&store)), month()).with_clock(t0);
        let report = tracker.status(std::slice::from_ref(&site)).await.unwrap();

        assert!(report.sites[0].is_new);
        assert_eq!(report.sites[0].last_modified, Some(t0()));
        assert_eq!(report.changed, vec![site.url.clone()]);

        let saved = store.snapshot();
        assert_eq!(saved[0].content.as_deref(), Some("v2"));
        assert_eq!(saved[0].last_modified, Some(t0()));
    }

    #[tokio::test]
    async fn test_first_sighting_is_not_new() {
        let site = Site::new("Studio", "http://studio.example/").with_selector(".latest");
        let crawler = StaticCrawler::new(vec![selector_observation(&site, "v1")]);

        let tracker = Tracker::new(crawler, MemoryStore::new(), month());
        let report = tracker.status(std::slice::from_ref(&site)).await.unwrap();

        assert!(!report.sites[0].is_new);
        assert_eq!(report.first_seen, vec![site.url.clone()]);
    }

    #[tokio::test]
    async fn test_unchanged_content_is_idempotent_across_runs() {
        let site = Site::new("Studio", "http://studio.example/").with_selector(".latest");
        let store = Arc::new(MemoryStore::new());
        let sites = [site.clone()];

        let first = Tracker::new(
            StaticCrawler::new(vec![selector_observation(&site, "v1")]),
            Shared(Arc::clone(&store)),
            month(),
        )
        .with_clock(t0);
        let run1 = first.status(&sites).await.unwrap();

        let second = Tracker::new(
            StaticCrawler::new(vec![selector_observation(&site, "v1")]),
            Shared(Arc::clone(&store)),
            month(),
        )
        .with_clock(|| t0() + Duration::days(3));
        let run2 = second.status(&sites).await.unwrap();

        assert_eq!(run1.sites[0].last_modified, run2.sites[0].last_modified);

        let third = Tracker::new(
            StaticCrawler::new(vec![selector_observation(&site, "v2")]),
            Shared(Arc::clone(&store)),
            month(),
        )
        .with_clock(|| t0() + Duration::days(4));
        let run3 = third.status(&sites).await.unwrap();

        assert!(run3.sites[0].last_modified > run2.sites[0].last_modified);
        assert!(run3.sites[0].is_new);
    }

    #[tokio::test]
    async fn test_timed_out_site_is_dropped_from_store() {
        let fast = Site::new("Fast", "http://fast.example/").with_selector("h1");
        let slow = Site::new("Slow", "http://slow.example/").with_selector("h1");

        let mut prior_fast = selector_observation(&fast, "<h1>hi</h1>");
        prior_fast.last_modified = Some(t0() - Duration::days(5));
        let mut prior_slow = selector_observation(&slow, "<h1>hi</h1>");
        prior_slow.last_modified = Some(t0() - Duration::days(5));
        let store = Arc::new(MemoryStore::with_observations(&[prior_fast, prior_slow]));

        let fetcher = MockFetcher::new()
            .page(&fast.url, "<h1>hi</h1>", None)
            .page(&slow.url, "<h1>hi</h1>", None)
            .delay(&slow.url, std::time::Duration::from_secs(5));
        let config = crate::models::CrawlerConfig {
            timeout_ms: 50,
            ..Default::default()
        };
        let crawler = Crawler::new(fetcher, &config);

        let tracker = Tracker::new(crawler, Shared(Arc::clone(&store)), month()).with_clock(t0);
        let report = tracker.status(&[fast.clone(), slow.clone()]).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].site.url, slow.url);
        assert!(matches!(report.failures[0].error, AppError::Fetch { .. }));
        assert_eq!(report.dropped, vec![slow.url.clone()]);

        let saved = store.snapshot();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].url, fast.url);
        assert_eq!(saved[0].last_modified, Some(t0() - Duration::days(5)));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_mode_switch_is_not_new() {
        let before = Site::new("Blog", "http://blog.example/");
        let store = MemoryStore::with_observations(&[stamped(&before, t0() - Duration::days(1))]);

        let after = before.clone().with_selector("article");
        let crawler = StaticCrawler::new(vec![selector_observation(&after, "<article/>")]);

        let tracker = Tracker::new(crawler, store, month()).with_clock(t0);
        let report = tracker.status(std::slice::from_ref(&after)).await.unwrap();

        assert!(!report.sites[0].is_new);
        assert_eq!(report.sites[0].last_modified, Some(t0() - month()));
    }

    #[tokio::test]
    async fn test_store_read_error_aborts_before_crawl() {
        let site = Site::new("A", "http://a.example/");
        let crawled = Arc::new(Mutex::new(false));

        struct SpyCrawler(Arc<Mutex<bool>>);
        #[async_trait]
        impl SiteCrawler for SpyCrawler {
            async fn crawl(&self, _: &[Site]) -> crate::pipeline::CrawlOutcome {
                *self.0.lock().unwrap() = true;
                Default::default()
            }
        }

        let tracker = Tracker::new(SpyCrawler(Arc::clone(&crawled)), BrokenStore, month());
        let err = tracker.status(&[site]).await.unwrap_err();

        assert!(matches!(err, AppError::StoreRead { .. }));
        assert!(!*crawled.lock().unwrap());
    }

    #[tokio::test]
    async fn test_all_sites_failing_still_rewrites_store() {
        let site = Site::new("A", "http://a.example/");
        let store = Arc::new(MemoryStore::with_observations(&[stamped(&site, t0())]));

        let tracker = Tracker::new(StaticCrawler::default(), Shared(Arc::clone(&store)), month());
        let report = tracker.status(std::slice::from_ref(&site)).await.unwrap();

        assert!(report.sites.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(store.snapshot().is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_render_default_view() {
        let old = Site::new("Old Example", "http://oldexample.com/");
        let store = MemoryStore::with_observations(&[stamped(&old, t0() - Duration::days(40))]);
        let crawler = StaticCrawler::new(vec![Observation::for_site(&old)]);

        let tracker = Tracker::new(crawler, store, month()).with_clock(t0);
        let (page, _) = tracker.render(&[old], &HtmlView::default()).await.unwrap();

        assert!(page.contains("<a href=\"http://oldexample.com/\">Old Example</a>"));
        assert!(!page.contains("class=\"new\">New"));
    }

    #[tokio::test]
    async fn test_render_custom_view() {
        let site = Site::new("A", "http://a.example/");
        let crawler = StaticCrawler::new(vec![stamped(&site, t0())]);
        let tracker = Tracker::new(crawler, MemoryStore::new(), month()).with_clock(t0);

        let view = |sites: &[SiteStatus]| {
            sites
                .iter()
                .map(|s| format!("{}:{}", s.name, s.is_new))
                .collect::<Vec<_>>()
                .join(",")
        };
        let (page, _) = tracker.render(&[site], &view).await.unwrap();
        assert_eq!(page, "A:true");
    }

    #[tokio::test]
    async fn test_custom_expiration() {
        let site = Site::new("A", "http://a.example/");
        let crawler = StaticCrawler::new(vec![stamped(&site, t0() - Duration::days(10))]);

        let tracker = Tracker::new(crawler, MemoryStore::new(), Duration::days(7)).with_clock(t0);
        let report = tracker.status(std::slice::from_ref(&site)).await.unwrap();
        assert!(!report.sites[0].is_new);
    }
}
