use crate::language::EU_LANGUAGES;
use serde::Deserialize;

/// Main configuration structure for the crawler node
///
/// Every section has sensible defaults, so an empty TOML file yields a
/// working local configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    pub crawler: CrawlerConfig,
    pub user_agent: UserAgentConfig,
    pub politeness: PolitenessConfig,
    pub discovery: DiscoveryConfig,
    pub language: LanguageConfig,
}

/// Where to find the coordinator API
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CoordinatorConfig {
    /// Base URL of the coordinator service
    pub base_url: String,

    /// API version segment
    pub api_version: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_version: "v1".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Batch size: tasks leased and crawled concurrently
    pub max_concurrent_requests: u32,

    /// Page fetch timeout in seconds
    pub request_timeout_secs: u64,

    /// How long to wait when the coordinator has no tasks
    pub idle_backoff_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            request_timeout_secs: 30,
            idle_backoff_secs: 5,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Eurocrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://eurocrawl.example/about".to_string(),
            contact_email: "crawler@eurocrawl.example".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value:
    /// `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Politeness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Whether to check robots.txt and apply crawl delays at all
    pub respect_robots_txt: bool,

    /// Delay between same-domain requests when robots.txt sets none (seconds)
    pub default_crawl_delay_secs: f64,

    /// Timeout for robots.txt fetches (seconds)
    pub robots_timeout_secs: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            respect_robots_txt: true,
            default_crawl_delay_secs: 1.0,
            robots_timeout_secs: 10,
        }
    }
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Whether to discover and submit outbound links at all
    pub extract_links: bool,

    /// Upper bound on links submitted per page
    pub max_links_per_page: usize,

    /// Crawl depth ceiling
    pub max_depth: u32,

    /// Quality floor below which a page's links are not expanded
    pub min_parent_score: u32,

    /// Quality score assumed for crawled pages until an upstream evaluator
    /// supplies real scores
    pub default_parent_score: u32,

    /// Flat frontier priority for submitted links
    pub submit_priority: u8,

    /// Map the discoverer's high/medium/low buckets onto frontier priorities
    /// instead of using the flat value
    pub use_priority_buckets: bool,

    /// Override the built-in allowed-domain patterns
    pub allowed_domains: Option<Vec<String>>,

    /// Override the built-in blocked URL patterns
    pub blocked_patterns: Option<Vec<String>>,

    /// Override the built-in blocked extension set
    pub blocked_extensions: Option<Vec<String>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extract_links: true,
            max_links_per_page: 100,
            max_depth: 3,
            min_parent_score: 60,
            default_parent_score: 0,
            submit_priority: 6,
            use_priority_buckets: false,
            allowed_domains: None,
            blocked_patterns: None,
            blocked_extensions: None,
        }
    }
}

/// Language filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LanguageConfig {
    /// Whether discovered links are filtered by predicted language
    pub filter_by_language: bool,

    /// Language codes considered in scope
    pub allowed_languages: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            filter_by_language: true,
            allowed_languages: EU_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}
