//! Pipeline entry points for a tracker run.
//!
//! - `crawl`: fetch and extract every site with bounded concurrency
//! - `diff`: reconcile fresh observations against the baseline
//! - `freshness`: flag sites changed inside the expiration window
//! - `status`: the full run, from baseline load to classified report

pub mod crawl;
pub mod diff;
pub mod freshness;
pub mod status;

pub use crawl::{CrawlOutcome, Crawler, SiteCrawler, SiteFailure};
pub use diff::{Reconciliation, reconcile};
pub use freshness::{classify, is_new};
pub use status::{StatusReport, Tracker};
