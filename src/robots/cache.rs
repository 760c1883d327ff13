//! Process-lifetime robots.txt cache with single-flight population
//!
//! Policies are cached per domain key (scheme + host, port stripped) and
//! reused for the lifetime of the process; there is no TTL-based refresh.
//! Population is single-flight: concurrent first accesses to the same unseen
//! domain coalesce onto one fetch instead of racing.

use crate::robots::RobotsPolicy;
use crate::url::robots_key;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Fetches and caches per-domain robots.txt policies
///
/// `get_or_fetch` is the only mutation entry point; `can_fetch` and
/// `crawl_delay` go through it. A non-200 response or transport error during
/// the fetch yields a permissive policy rather than an error.
pub struct RobotsCache {
    client: Client,
    user_agent: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<RobotsPolicy>>>>>,
}

impl RobotsCache {
    /// Creates a robots cache with its own short-timeout HTTP client
    ///
    /// # Arguments
    ///
    /// * `user_agent` - the crawler's User-Agent, sent on robots.txt fetches
    ///   and matched against User-agent groups
    /// * `timeout` - request timeout for robots.txt fetches
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Checks whether a URL may be fetched according to robots.txt
    ///
    /// Unparseable URLs are allowed through; they will fail at fetch time
    /// with a proper transport error instead.
    pub async fn can_fetch(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return true,
        };

        let policy = self.get_or_fetch(&parsed).await;
        policy.is_allowed(url, &self.user_agent)
    }

    /// Returns the crawl delay in seconds for a URL's domain, if robots.txt
    /// specifies one
    pub async fn crawl_delay(&self, url: &str) -> Option<f64> {
        let parsed = Url::parse(url).ok()?;
        let policy = self.get_or_fetch(&parsed).await;
        policy.crawl_delay(&self.user_agent)
    }

    /// Returns the cached policy for the URL's domain, fetching it on first
    /// access
    ///
    /// Concurrent callers for the same unseen domain share a single fetch;
    /// different domains fetch independently.
    pub async fn get_or_fetch(&self, url: &Url) -> Arc<RobotsPolicy> {
        let key = match robots_key(url) {
            Some(key) => key,
            // No host: nothing to look up, nothing to restrict
            None => return Arc::new(RobotsPolicy::permissive()),
        };

        let cell = {
            let mut entries = self.entries.lock().unwrap();
            entries.entry(key.clone()).or_default().clone()
        };

        cell.get_or_init(|| self.fetch_policy(key)).await.clone()
    }

    /// Clears all cached policies (intended for tests)
    pub fn clear_cache(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of domains with a cache entry
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    async fn fetch_policy(&self, key: String) -> Arc<RobotsPolicy> {
        let robots_url = format!("{}/robots.txt", key);
        tracing::debug!("fetching robots.txt from {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => Arc::new(RobotsPolicy::from_content(&body)),
                Err(e) => {
                    tracing::debug!("failed to read robots.txt body from {}: {}", robots_url, e);
                    Arc::new(RobotsPolicy::permissive())
                }
            },
            Ok(response) => {
                tracing::debug!(
                    "robots.txt at {} returned HTTP {}, treating as unrestricted",
                    robots_url,
                    response.status()
                );
                Arc::new(RobotsPolicy::permissive())
            }
            Err(e) => {
                tracing::debug!(
                    "failed to fetch robots.txt from {}: {}, treating as unrestricted",
                    robots_url,
                    e
                );
                Arc::new(RobotsPolicy::permissive())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn cache() -> RobotsCache {
        RobotsCache::new("TestBot/1.0", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_disallowed_path_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
            )
            .mount(&server)
            .await;

        let cache = cache().await;
        assert!(!cache.can_fetch(&format!("{}/private/page", server.uri())).await);
        assert!(cache.can_fetch(&format!("{}/public", server.uri())).await);
    }

    #[tokio::test]
    async fn test_second_lookup_uses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache().await;
        assert!(cache.can_fetch(&format!("{}/a", server.uri())).await);
        assert!(cache.can_fetch(&format!("{}/b", server.uri())).await);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_single_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(cache().await);
        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            let url = format!("{}/page-{}", server.uri(), i);
            handles.push(tokio::spawn(async move { cache.can_fetch(&url).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_missing_robots_is_permissive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let cache = cache().await;
        assert!(cache.can_fetch(&format!("{}/anything", server.uri())).await);
        assert_eq!(cache.crawl_delay(&format!("{}/anything", server.uri())).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_permissive() {
        let cache = RobotsCache::new("TestBot/1.0", Duration::from_millis(200)).unwrap();
        // Reserved TEST-NET address, nothing listens there
        assert!(cache.can_fetch("http://192.0.2.1/page").await);
    }

    #[tokio::test]
    async fn test_crawl_delay_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 3"),
            )
            .mount(&server)
            .await;

        let cache = cache().await;
        assert_eq!(
            cache.crawl_delay(&format!("{}/page", server.uri())).await,
            Some(3.0)
        );
    }

    #[tokio::test]
    async fn test_malformed_url_allowed() {
        let cache = cache().await;
        assert!(cache.can_fetch("not a url").await);
    }

    #[tokio::test]
    async fn test_clear_cache_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(2)
            .mount(&server)
            .await;

        let cache = cache().await;
        assert!(cache.can_fetch(&format!("{}/a", server.uri())).await);
        cache.clear_cache();
        assert!(cache.is_empty());
        assert!(cache.can_fetch(&format!("{}/b", server.uri())).await);
    }
}
