//! Default HTML page.

use std::collections::BTreeMap;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::SiteStatus;
use crate::view::View;

const STYLE: &str = "body{font-family:sans-serif;max-width:40em;margin:2em auto}\
li{margin:.3em 0}.new{color:#fff;background:#d33;border-radius:3px;\
padding:0 .3em;margin-left:.5em;font-size:.8em}";

/// List of links with a `New` badge, grouped by category.
#[derive(Debug, Clone)]
pub struct HtmlView {
    pub title: String,
}

impl Default for HtmlView {
    fn default() -> Self {
        Self {
            title: "New work".to_string(),
        }
    }
}

impl HtmlView {
    fn list(out: &mut String, sites: &[&SiteStatus]) {
        out.push_str("<ul>\n");
        for site in sites {
            out.push_str(&format!(
                "<li><a href=\"{}\">{}</a>",
                encode_double_quoted_attribute(&site.url),
                encode_text(&site.name)
            ));
            if site.is_new {
                out.push_str("<span class=\"new\">New</span>");
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }
}

impl View for HtmlView {
    fn render(&self, sites: &[SiteStatus]) -> String {
        let mut uncategorized = Vec::new();
        let mut groups: BTreeMap<&str, Vec<&SiteStatus>> = BTreeMap::new();
        for site in sites {
            match site.category.as_deref() {
                Some(category) => groups.entry(category).or_default().push(site),
                None => uncategorized.push(site),
            }
        }

        let title = encode_text(&self.title);
        let mut out = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<div>\n"
        );

        if !uncategorized.is_empty() {
            Self::list(&mut out, &uncategorized);
        }
        for (category, members) in &groups {
            out.push_str(&format!("<h2>{}</h2>\n", encode_text(category)));
            Self::list(&mut out, members);
        }

        out.push_str("</div>\n</body>\n</html>\n");
        out
    }
}
