//! Service layer for the tracker.
//!
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Change extraction (`extract`)

mod extractor;
mod fetcher;

pub use extractor::{extract, parse_http_date};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
