// src/utils/url.rs

//! URL normalization and comparison.

use url::Url;

use crate::error::Result;

/// Normalize a user-supplied URL.
///
/// A missing scheme defaults to `http://`. Parsing lowercases the host and
/// drops a default port; fragments, `www.` and trailing slashes are kept.
///
/// # Examples
/// ```
/// use newwork::utils::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("Example.com:80/work").unwrap(),
///     "http://example.com/work"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    Ok(Url::parse(&with_scheme)?.to_string())
}

/// Compare two URLs after normalization, ignoring a trailing slash.
pub fn same_url(a: &str, b: &str) -> bool {
    match (normalize_url(a), normalize_url(b)) {
        (Ok(a), Ok(b)) => a.trim_end_matches('/') == b.trim_end_matches('/'),
        _ => a == b,
    }
}
