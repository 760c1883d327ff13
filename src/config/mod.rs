//! Configuration loading, validation, and integrity hashing
//!
//! Configuration is a TOML file with kebab-case keys. Every field has a
//! default, so a worker can start with an empty file and be pointed at a
//! local coordinator.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, CoordinatorConfig, CrawlerConfig, DiscoveryConfig, LanguageConfig, PolitenessConfig,
    UserAgentConfig,
};
pub use validation::validate;
