//! Per-task crawl orchestration
//!
//! Drives each task through the state machine
//! `PENDING -> CRAWLING -> {COMPLETED | FAILED}`: robots gate, politeness
//! delay, fetch, content-type check, extraction, link discovery, and result
//! submission. Tasks in a batch run concurrently as independent spawned
//! tasks, so one failure never takes down its siblings; batches themselves
//! are strictly sequential.

use crate::config::Config;
use crate::coordinator::{ContentSubmission, CoordinatorClient, CrawlTask, LinkSubmission};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::throttle::DomainThrottle;
use crate::discover::{LinkDiscoverer, LinkPriority};
use crate::extract::{ContentExtractor, DomExtractor, ExtractedContent, MIN_TEXT_LENGTH};
use crate::language::LanguagePredictor;
use crate::robots::RobotsCache;
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use url::Url;

/// Terminal failure reasons for a single task, reported verbatim to the
/// coordinator
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Disallowed by robots.txt")]
    RobotsDisallowed,

    #[error("Request error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Not HTML: {0}")]
    ContentType(String),

    #[error("Content extraction failed")]
    Extraction,

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<FetchError> for TaskError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Status { status } => TaskError::HttpStatus(status),
            other => TaskError::Transport(other.to_string()),
        }
    }
}

/// The crawler worker: leases task batches from the coordinator and runs
/// them through the per-task state machine
///
/// Cloning is cheap; all heavy state is shared behind `Arc`, which is also
/// what lets every task in a batch run as its own spawned tokio task.
#[derive(Clone)]
pub struct Crawler {
    config: Arc<Config>,
    coordinator: Arc<CoordinatorClient>,
    robots: Arc<RobotsCache>,
    throttle: Arc<DomainThrottle>,
    discoverer: Arc<LinkDiscoverer>,
    extractor: Arc<dyn ContentExtractor>,
    fetcher: PageFetcher,
}

impl Crawler {
    /// Builds a crawler from configuration
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let user_agent = config.user_agent.header_value();

        let coordinator = CoordinatorClient::new(
            &config.coordinator.base_url,
            &config.coordinator.api_version,
        )?;

        let robots = RobotsCache::new(
            &user_agent,
            Duration::from_secs(config.politeness.robots_timeout_secs),
        )?;

        let fetcher = PageFetcher::new(
            &user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        let mut discoverer = LinkDiscoverer::new()
            .with_max_depth(config.discovery.max_depth)
            .with_min_parent_score(config.discovery.min_parent_score);

        if let Some(domains) = &config.discovery.allowed_domains {
            let patterns: Vec<&str> = domains.iter().map(String::as_str).collect();
            discoverer = discoverer.with_allowed_domains(&patterns)?;
        }
        if let Some(blocked) = &config.discovery.blocked_patterns {
            let patterns: Vec<&str> = blocked.iter().map(String::as_str).collect();
            discoverer = discoverer.with_blocked_patterns(&patterns)?;
        }
        if let Some(extensions) = &config.discovery.blocked_extensions {
            discoverer = discoverer.with_blocked_extensions(extensions.clone());
        }
        if config.language.filter_by_language {
            let allowed = config.language.allowed_languages.iter().cloned().collect();
            discoverer = discoverer.with_language_filter(LanguagePredictor::new(), allowed);
        }

        Ok(Self {
            config: Arc::new(config),
            coordinator: Arc::new(coordinator),
            robots: Arc::new(robots),
            throttle: Arc::new(DomainThrottle::new()),
            discoverer: Arc::new(discoverer),
            extractor: Arc::new(DomExtractor::new()),
            fetcher,
        })
    }

    /// Replaces the content extractor (for deployments with a heavier
    /// readability engine, and for tests)
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs the batch loop until `max_tasks` tasks completed successfully
    ///
    /// Each batch is leased from the coordinator, crawled concurrently, and
    /// fully drained before the next lease. An empty lease backs off for the
    /// configured idle interval. Successfully extracted content is handed to
    /// `on_content` as tasks finish.
    pub async fn run<F>(&self, max_tasks: usize, mut on_content: F) -> Result<usize, CrawlError>
    where
        F: FnMut(ExtractedContent),
    {
        let mut completed = 0usize;

        while completed < max_tasks {
            let batch = self
                .coordinator
                .fetch_next(self.config.crawler.max_concurrent_requests)
                .await?;

            if batch.is_empty() {
                tracing::info!(
                    "no tasks available, waiting {}s",
                    self.config.crawler.idle_backoff_secs
                );
                tokio::time::sleep(Duration::from_secs(self.config.crawler.idle_backoff_secs))
                    .await;
                continue;
            }

            completed += self.crawl_batch(batch, &mut on_content).await;
        }

        Ok(completed)
    }

    /// Crawls one batch of tasks concurrently and returns how many completed
    ///
    /// Every task runs in its own spawned tokio task; a panic in one is
    /// logged and confined there, so siblings always finish.
    pub async fn crawl_batch<F>(&self, batch: Vec<CrawlTask>, on_content: &mut F) -> usize
    where
        F: FnMut(ExtractedContent),
    {
        let mut set = JoinSet::new();
        for task in batch {
            let crawler = self.clone();
            set.spawn(async move { crawler.process_task(task).await });
        }

        let mut completed = 0;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(content)) => {
                    completed += 1;
                    on_content(content);
                }
                Ok(None) => {}
                Err(e) => tracing::error!("crawl task aborted: {}", e),
            }
        }
        completed
    }

    /// Processes one task end to end, reporting the outcome to the
    /// coordinator
    ///
    /// Returns the extracted content when the task completed, `None` when it
    /// failed. Outcome reporting failures are logged; the coordinator owns
    /// retry in that case.
    async fn process_task(&self, task: CrawlTask) -> Option<ExtractedContent> {
        let outcome = match self.coordinator.mark_crawling(task.id).await {
            Ok(()) => self.crawl_task(&task).await,
            Err(e) => Err(TaskError::Unexpected(e.to_string())),
        };

        match outcome {
            Ok(content) => {
                if let Err(e) = self.coordinator.mark_completed(task.id).await {
                    tracing::warn!("failed to mark task {} completed: {}", task.id, e);
                }
                Some(content)
            }
            Err(error) => {
                tracing::info!("task {} ({}) failed: {}", task.id, task.url, error);
                if let Err(e) = self
                    .coordinator
                    .mark_failed(task.id, &error.to_string())
                    .await
                {
                    tracing::warn!("failed to mark task {} failed: {}", task.id, e);
                }
                None
            }
        }
    }

    /// The per-task pipeline: robots gate, politeness delay, fetch,
    /// content-type check, extraction, then best-effort submissions
    async fn crawl_task(&self, task: &CrawlTask) -> Result<ExtractedContent, TaskError> {
        let url = &task.url;

        if self.config.politeness.respect_robots_txt {
            if !self.robots.can_fetch(url).await {
                return Err(TaskError::RobotsDisallowed);
            }

            // Clamp whatever the remote robots.txt declared to something
            // Duration can represent.
            let delay = self
                .robots
                .crawl_delay(url)
                .await
                .filter(|d| d.is_finite())
                .unwrap_or(self.config.politeness.default_crawl_delay_secs)
                .max(0.0);
            self.throttle
                .acquire(&self.task_domain(task), Duration::from_secs_f64(delay))
                .await;
        }

        let page = self.fetcher.get(url).await?;

        if !page.content_type.to_lowercase().contains("text/html") {
            return Err(TaskError::ContentType(page.content_type));
        }

        let content = self
            .extractor
            .extract(&page.body, url)
            .ok_or(TaskError::Extraction)?;

        if self.config.discovery.extract_links {
            self.submit_discovered_links(task, &page.body).await;
        }

        if content.text.len() >= MIN_TEXT_LENGTH {
            self.submit_content(task, &content).await;
        } else {
            tracing::debug!(
                "skipping content submission for {}: content too short ({} chars)",
                url,
                content.text.len()
            );
        }

        Ok(content)
    }

    /// Discovers links on the page and submits them to the frontier;
    /// failures here never fail the task
    async fn submit_discovered_links(&self, task: &CrawlTask, html: &str) {
        let discovery = &self.config.discovery;

        // Leased tasks carry no depth or quality score yet, so discovery
        // runs with the configured stand-ins.
        let links = self
            .discoverer
            .discover(html, &task.url, discovery.default_parent_score, 0);
        if links.is_empty() {
            return;
        }

        let cap = discovery.max_links_per_page;
        if links.len() > cap {
            tracing::debug!(
                "capping link submission for {} at {} of {}",
                task.url,
                cap,
                links.len()
            );
        }

        let batch: Vec<LinkSubmission> = links
            .iter()
            .take(cap)
            .map(|link| LinkSubmission {
                url: link.url.clone(),
                priority: self.frontier_priority(link.priority),
            })
            .collect();

        match self.coordinator.submit_links(&task.url, &batch).await {
            Ok(receipt) => tracing::info!(
                "submitted {} links from {}: {} new, {} duplicates",
                batch.len(),
                task.url,
                receipt.added,
                receipt.skipped
            ),
            Err(e) => tracing::warn!(
                "failed to submit {} links from {}: {}",
                batch.len(),
                task.url,
                e
            ),
        }
    }

    /// Submits extracted content for indexing; failures here never fail the
    /// task
    async fn submit_content(&self, task: &CrawlTask, content: &ExtractedContent) {
        let submission = ContentSubmission {
            url_id: task.id,
            title: content.title.clone(),
            content: content.text.clone(),
            language: content.language.clone(),
            author: content.author.clone(),
            date: content.date.clone(),
        };

        match self.coordinator.submit_content(&submission).await {
            Ok(receipt) => tracing::debug!(
                "submitted content for {} (id {}, status {})",
                task.url,
                receipt.id,
                receipt.status
            ),
            Err(e) => tracing::warn!("failed to submit content for {}: {}", task.url, e),
        }
    }

    /// Maps a discovery priority bucket to the frontier priority value
    fn frontier_priority(&self, priority: LinkPriority) -> u8 {
        if self.config.discovery.use_priority_buckets {
            match priority {
                LinkPriority::High => 2,
                LinkPriority::Medium => 5,
                LinkPriority::Low => 8,
            }
        } else {
            self.config.discovery.submit_priority
        }
    }

    /// The throttle key for a task: the coordinator-supplied domain, or the
    /// URL host when the task carries none
    fn task_domain(&self, task: &CrawlTask) -> String {
        if !task.domain.is_empty() {
            return task.domain.clone();
        }
        Url::parse(&task.url)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| task.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_with(mut configure: impl FnMut(&mut Config)) -> Crawler {
        let mut config = Config::default();
        configure(&mut config);
        Crawler::new(config).unwrap()
    }

    #[test]
    fn test_flat_priority_mapping() {
        let crawler = crawler_with(|config| config.discovery.submit_priority = 6);
        assert_eq!(crawler.frontier_priority(LinkPriority::High), 6);
        assert_eq!(crawler.frontier_priority(LinkPriority::Medium), 6);
        assert_eq!(crawler.frontier_priority(LinkPriority::Low), 6);
    }

    #[test]
    fn test_bucketed_priority_mapping() {
        let crawler = crawler_with(|config| config.discovery.use_priority_buckets = true);
        assert_eq!(crawler.frontier_priority(LinkPriority::High), 2);
        assert_eq!(crawler.frontier_priority(LinkPriority::Medium), 5);
        assert_eq!(crawler.frontier_priority(LinkPriority::Low), 8);
    }

    #[test]
    fn test_task_domain_falls_back_to_host() {
        let crawler = crawler_with(|_| {});
        let task = CrawlTask {
            id: 1,
            url: "https://Example.COM/page".to_string(),
            priority: 5,
            domain: String::new(),
            status: "pending".to_string(),
        };
        assert_eq!(crawler.task_domain(&task), "example.com");

        let task = CrawlTask {
            domain: "example.org".to_string(),
            ..task
        };
        assert_eq!(crawler.task_domain(&task), "example.org");
    }

    #[test]
    fn test_invalid_discovery_pattern_rejected() {
        let mut config = Config::default();
        config.discovery.allowed_domains = Some(vec!["(".to_string()]);
        assert!(Crawler::new(config).is_err());
    }

    #[test]
    fn test_fetch_error_conversion() {
        let error: TaskError = FetchError::Status { status: 404 }.into();
        assert_eq!(error.to_string(), "HTTP 404");

        let error: TaskError = FetchError::Timeout {
            url: "https://example.com/".to_string(),
        }
        .into();
        assert!(error.to_string().starts_with("Request error:"));
    }
}
