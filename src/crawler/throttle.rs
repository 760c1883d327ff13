//! Per-domain politeness throttle
//!
//! Serializes requests per domain: every fetch routes through `acquire`,
//! which holds the domain's slot while waiting out the remaining crawl
//! delay. Two concurrent tasks targeting the same domain therefore space
//! their requests by the full delay, while requests to different domains
//! proceed independently. The first request to a domain is not delayed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{sleep, Duration, Instant};

/// Tracks the last request time per domain and enforces the delay between
/// consecutive requests to the same domain
#[derive(Debug, Default)]
pub struct DomainThrottle {
    domains: Mutex<HashMap<String, Arc<AsyncMutex<Option<Instant>>>>>,
}

impl DomainThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until a request to `domain` is permitted, then records it
    ///
    /// Holding the per-domain slot across the sleep is what serializes
    /// same-domain callers; the map lock itself is only held to look up the
    /// slot.
    pub async fn acquire(&self, domain: &str, delay: Duration) {
        let slot = {
            let mut domains = self.domains.lock().unwrap();
            domains.entry(domain.to_string()).or_default().clone()
        };

        let mut last_request = slot.lock().await;
        if let Some(previous) = *last_request {
            let wait = delay.saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                tracing::trace!("throttling {} for {:?}", domain, wait);
                sleep(wait).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_not_delayed() {
        let throttle = DomainThrottle::new();
        let start = Instant::now();
        throttle.acquire("example.com", Duration::from_secs(1)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_waits_out_delay() {
        let throttle = DomainThrottle::new();
        let start = Instant::now();
        throttle.acquire("example.com", Duration::from_secs(2)).await;
        throttle.acquire("example.com", Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_domains_independent() {
        let throttle = DomainThrottle::new();
        let start = Instant::now();
        throttle.acquire("a.example", Duration::from_secs(5)).await;
        throttle.acquire("b.example", Duration::from_secs(5)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_domain_serialized() {
        let throttle = Arc::new(DomainThrottle::new());
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let throttle = throttle.clone();
            handles.push(tokio::spawn(async move {
                throttle.acquire("example.com", Duration::from_secs(1)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Three requests, two enforced gaps
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_delay() {
        let throttle = DomainThrottle::new();
        throttle.acquire("example.com", Duration::from_secs(4)).await;

        sleep(Duration::from_secs(3)).await;

        let start = Instant::now();
        throttle.acquire("example.com", Duration::from_secs(4)).await;
        // Only the remaining second is waited
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_never_waits() {
        let throttle = DomainThrottle::new();
        let start = Instant::now();
        throttle.acquire("example.com", Duration::ZERO).await;
        throttle.acquire("example.com", Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
