//! Eurocrawl: a polite crawler worker node
//!
//! This crate implements a worker node in a distributed crawl pipeline. It
//! pulls crawl tasks from an external coordinator, enforces robots.txt
//! politeness and per-domain delays, extracts readable content, discovers
//! outbound links with quality- and language-based filtering, and reports
//! results back to the coordinator.

pub mod config;
pub mod coordinator;
pub mod crawler;
pub mod discover;
pub mod extract;
pub mod language;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for eurocrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Coordinator error: {0}")]
    Coordinator(#[from] coordinator::CoordinatorError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for eurocrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{CoordinatorClient, CrawlTask};
pub use crawler::{Crawler, TaskError};
pub use discover::{DiscoveredLink, LinkDiscoverer, LinkPriority};
pub use extract::{ContentExtractor, DomExtractor, ExtractedContent};
pub use language::{LanguagePredictor, Prediction};
pub use robots::RobotsCache;
