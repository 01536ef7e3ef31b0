//! Presentation adapters.
//!
//! A [`View`] turns classified sites into a rendered page. Plain closures
//! work as views too.

mod html;
mod text;

use chrono::{DateTime, Utc};

use crate::models::SiteStatus;

pub use html::HtmlView;
pub use text::TextView;

/// Renders classified sites.
pub trait View: Send + Sync {
    fn render(&self, sites: &[SiteStatus]) -> String;
}

impl<F> View for F
where
    F: Fn(&[SiteStatus]) -> String + Send + Sync,
{
    fn render(&self, sites: &[SiteStatus]) -> String {
        self(sites)
    }
}

/// Describe how long ago `then` was, e.g. `3 days ago`.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    if elapsed.num_seconds() < 0 {
        return "in the future".to_string();
    }

    let (amount, unit) = match elapsed {
        e if e.num_minutes() < 1 => return "just now".to_string(),
        e if e.num_hours() < 1 => (e.num_minutes(), "minute"),
        e if e.num_days() < 1 => (e.num_hours(), "hour"),
        e if e.num_days() < 30 => (e.num_days(), "day"),
        e if e.num_days() < 365 => (e.num_days() / 30, "month"),
        e => (e.num_days() / 365, "year"),
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}
