//! Plain-text table for the terminal.

use chrono::{DateTime, Utc};

use crate::models::SiteStatus;
use crate::view::{View, relative_age};

/// Aligned columns: name, url, new flag, age.
#[derive(Debug, Clone)]
pub struct TextView {
    now: DateTime<Utc>,
}

impl TextView {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for TextView {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl View for TextView {
    fn render(&self, sites: &[SiteStatus]) -> String {
        let rows: Vec<[String; 4]> = sites
            .iter()
            .map(|s| {
                [
                    s.name.clone(),
                    s.url.clone(),
                    if s.is_new { "NEW".into() } else { String::new() },
                    s.last_modified
                        .map(|ts| relative_age(ts, self.now))
                        .unwrap_or_else(|| "unknown".into()),
                ]
            })
            .collect();

        let mut widths = [0usize; 4];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for row in &rows {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
