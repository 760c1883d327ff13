//! URL helpers shared by the robots cache and the link discoverer
//!
//! Normalization here is deliberately light: discovered links keep their
//! original scheme and host, and only the fragment and trailing slashes are
//! stripped. Frontier-level deduplication belongs to the coordinator.

use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use eurocrawl::url::extract_domain;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Builds the cache key a robots.txt policy is stored under
///
/// The key is `scheme://host` with any port stripped, so `http://a.com:8080/x`
/// and `http://a.com/y` share one policy.
pub fn robots_key(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| format!("{}://{}", url.scheme(), host.to_lowercase()))
}

/// Resolves an href against a base URL and normalizes it for discovery
///
/// Returns the absolute URL as a string with the fragment removed and any
/// trailing slashes trimmed, or `None` when the href is empty or does not
/// resolve.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    let normalized = resolved.to_string();
    Some(normalized.trim_end_matches('/').to_string())
}
