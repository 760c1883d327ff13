//! Link discovery with quality- and language-based filtering
//!
//! Extracts candidate links from an HTML document and runs each one through a
//! fixed filter pipeline: scheme check, allowed-domain patterns, blocked URL
//! patterns, blocked file extensions, then optional language prediction.
//! Discovery is gated on the parent page's quality score and the crawl depth,
//! so low-value pages never expand the frontier.

use crate::language::{LanguagePredictor, Prediction};
use crate::url::resolve_href;
use crate::ConfigError;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Domain allowlist: links are only discovered on these hosts.
/// Patterns are implicitly anchored at the start of the host.
const ALLOWED_DOMAINS: &[&str] = &[
    r".*\.wikipedia\.org$",
    r".*\.wikimedia\.org$",
    r"docs\.python\.org$",
    r"developer\.mozilla\.org$",
    r".*\.readthedocs\.io$",
    r"stackoverflow\.com$",
    r"github\.com$",
    r"arxiv\.org$",
];

/// Blocked URL patterns: auth flows, commerce, admin surfaces, API endpoints,
/// sort/filter permutations, pagination beyond page 1, and mutating actions.
const BLOCKED_PATTERNS: &[&str] = &[
    r"/login",
    r"/register",
    r"/signup",
    r"/signin",
    r"/cart",
    r"/checkout",
    r"/admin",
    r"/api/",
    r"/rest/",
    r"/graphql",
    r"[?&]sort=",
    r"[?&]page=[2-9]",
    r"[?&]filter=",
    r"/edit",
    r"/delete",
    r"/remove",
];

/// Blocked file extensions: documents, media, archives, executables
const BLOCKED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".jpg", ".jpeg", ".png", ".gif",
    ".svg", ".ico", ".mp3", ".mp4", ".avi", ".mkv", ".mov", ".zip", ".tar", ".gz", ".rar",
    ".7z", ".exe", ".dll", ".so", ".dylib",
];

/// Default crawl depth ceiling
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Default quality floor: only pages scoring at least this expand links
pub const DEFAULT_MIN_PARENT_SCORE: u32 = 60;

/// Priority bucket assigned to a discovered link, derived from the parent
/// page's quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPriority {
    High,
    Medium,
    Low,
}

impl LinkPriority {
    /// Buckets a 0-100 parent quality score
    pub fn from_parent_score(score: u32) -> Self {
        if score >= 80 {
            Self::High
        } else if score >= 60 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A link that survived the discovery filter pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute URL, fragment-stripped, trailing slashes trimmed
    pub url: String,

    /// Priority bucket derived from the parent's quality score
    pub priority: LinkPriority,

    /// Crawl depth of the link (parent depth + 1)
    pub depth: u32,

    /// The page the link was found on
    pub parent_url: String,
}

/// Optional language gate applied to surviving links
struct LanguageFilter {
    predictor: LanguagePredictor,
    allowed: HashSet<String>,
}

/// Discovers links from HTML with quality-based filtering
///
/// All filter tables are injected at construction; `new()` supplies the
/// built-in defaults.
pub struct LinkDiscoverer {
    allowed_domains: Vec<Regex>,
    blocked_patterns: Vec<Regex>,
    blocked_extensions: Vec<String>,
    max_depth: u32,
    min_parent_score: u32,
    language_filter: Option<LanguageFilter>,
}

impl Default for LinkDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkDiscoverer {
    /// Creates a discoverer with the built-in filter tables
    pub fn new() -> Self {
        let blocked_extensions = BLOCKED_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        Self {
            // The built-in tables are fixed and known valid.
            allowed_domains: compile_anchored(ALLOWED_DOMAINS)
                .expect("built-in domain patterns are valid"),
            blocked_patterns: compile_case_insensitive(BLOCKED_PATTERNS)
                .expect("built-in blocked patterns are valid"),
            blocked_extensions,
            max_depth: DEFAULT_MAX_DEPTH,
            min_parent_score: DEFAULT_MIN_PARENT_SCORE,
            language_filter: None,
        }
    }

    /// Replaces the allowed-domain patterns
    ///
    /// Patterns are matched against the link's host and implicitly anchored
    /// at the start.
    pub fn with_allowed_domains(mut self, patterns: &[&str]) -> Result<Self, ConfigError> {
        self.allowed_domains = compile_anchored(patterns)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(self)
    }

    /// Replaces the blocked URL patterns (matched case-insensitively against
    /// path and query)
    pub fn with_blocked_patterns(mut self, patterns: &[&str]) -> Result<Self, ConfigError> {
        self.blocked_patterns = compile_case_insensitive(patterns)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(self)
    }

    /// Replaces the blocked file extension set
    pub fn with_blocked_extensions(mut self, extensions: Vec<String>) -> Self {
        self.blocked_extensions = extensions;
        self
    }

    /// Sets the crawl depth ceiling
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the parent quality floor below which no links are discovered
    pub fn with_min_parent_score(mut self, min_parent_score: u32) -> Self {
        self.min_parent_score = min_parent_score;
        self
    }

    /// Enables language filtering of discovered links
    ///
    /// Links predicted `Skip` or predicted as a language outside `allowed`
    /// are dropped; `Unknown` predictions are kept (fail open).
    pub fn with_language_filter(
        mut self,
        predictor: LanguagePredictor,
        allowed: HashSet<String>,
    ) -> Self {
        self.language_filter = Some(LanguageFilter { predictor, allowed });
        self
    }

    /// Discovers links from an HTML document
    ///
    /// # Arguments
    ///
    /// * `html` - raw HTML content
    /// * `base_url` - URL of the page, for resolving relative hrefs
    /// * `parent_score` - quality score of the page (0-100)
    /// * `depth` - crawl depth of the page itself
    ///
    /// Returns surviving links in document scan order, deduplicated by
    /// normalized URL with the first occurrence winning. Low-quality parents
    /// (`parent_score` below the floor) and pages at the depth ceiling yield
    /// nothing.
    pub fn discover(
        &self,
        html: &str,
        base_url: &str,
        parent_score: u32,
        depth: u32,
    ) -> Vec<DiscoveredLink> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        if parent_score < self.min_parent_score {
            tracing::debug!(
                "skipping link discovery for {}: parent score {} < {}",
                base_url,
                parent_score,
                self.min_parent_score
            );
            return Vec::new();
        }

        if depth >= self.max_depth {
            tracing::debug!(
                "skipping link discovery for {}: depth {} >= {}",
                base_url,
                depth,
                self.max_depth
            );
            return Vec::new();
        }

        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                tracing::debug!("cannot parse base URL {}: {}", base_url, e);
                return Vec::new();
            }
        };

        let document = Html::parse_document(html);
        let selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        let priority = LinkPriority::from_parent_score(parent_score);
        let mut seen = HashSet::new();
        let mut discovered = Vec::new();

        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(href) => href,
                None => continue,
            };

            let normalized = match resolve_href(&base, href) {
                Some(normalized) => normalized,
                None => continue,
            };

            if !self.should_crawl(&normalized) {
                continue;
            }

            if !seen.insert(normalized.clone()) {
                continue;
            }

            discovered.push(DiscoveredLink {
                url: normalized,
                priority,
                depth: depth + 1,
                parent_url: base_url.to_string(),
            });
        }

        if let Some(filter) = &self.language_filter {
            discovered.retain(|link| match filter.predictor.predict(&link.url) {
                Prediction::Skip => false,
                Prediction::Language(code) => filter.allowed.contains(&code),
                Prediction::Unknown => true,
            });
        }

        tracing::debug!(
            "discovered {} links from {} (score={}, depth={})",
            discovered.len(),
            base_url,
            parent_score,
            depth
        );

        discovered
    }

    /// Runs the per-candidate filter pipeline, short-circuiting on the first
    /// failing check
    fn should_crawl(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        let host = match parsed.host_str() {
            Some(host) => host,
            None => return false,
        };
        if !self.allowed_domains.iter().any(|re| re.is_match(host)) {
            return false;
        }

        let mut target = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            target.push('?');
            target.push_str(query);
        }
        if self.blocked_patterns.iter().any(|re| re.is_match(&target)) {
            return false;
        }

        let path = parsed.path().to_lowercase();
        if self.blocked_extensions.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }

        true
    }
}

/// Compiles host patterns, anchoring each at the start of the candidate
fn compile_anchored(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("^(?:{})", p)))
        .collect()
}

/// Compiles URL patterns with case-insensitive matching
fn compile_case_insensitive(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)))
        .collect()
}
