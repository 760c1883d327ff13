use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so operators can tell which configuration a worker is
/// actually running with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[coordinator]
base-url = "http://coordinator.internal:8000"
api-version = "v2"

[crawler]
max-concurrent-requests = 10
request-timeout-secs = 20
idle-backoff-secs = 3

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[politeness]
respect-robots-txt = true
default-crawl-delay-secs = 0.5
robots-timeout-secs = 8

[discovery]
extract-links = true
max-links-per-page = 50
max-depth = 2
min-parent-score = 70
default-parent-score = 80
submit-priority = 4
use-priority-buckets = true

[language]
filter-by-language = false
allowed-languages = ["de", "fr"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.coordinator.base_url, "http://coordinator.internal:8000");
        assert_eq!(config.coordinator.api_version, "v2");
        assert_eq!(config.crawler.max_concurrent_requests, 10);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.politeness.default_crawl_delay_secs, 0.5);
        assert_eq!(config.discovery.max_links_per_page, 50);
        assert!(config.discovery.use_priority_buckets);
        assert!(!config.language.filter_by_language);
        assert_eq!(config.language.allowed_languages, vec!["de", "fr"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.coordinator.base_url, "http://localhost:8000");
        assert_eq!(config.crawler.max_concurrent_requests, 5);
        assert!(config.politeness.respect_robots_txt);
        assert_eq!(config.discovery.max_links_per_page, 100);
        assert_eq!(config.language.allowed_languages.len(), 24);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = create_temp_config("[crawler]\nmax-concurrent-requests = 2\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_concurrent_requests, 2);
        assert_eq!(config.crawler.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_errors() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_errors() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation_failure_surfaces() {
        let file = create_temp_config("[crawler]\nmax-concurrent-requests = 0\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        assert_ne!(
            compute_config_hash(file1.path()).unwrap(),
            compute_config_hash(file2.path()).unwrap()
        );
    }

    #[test]
    fn test_user_agent_header_format() {
        let file = create_temp_config(
            r#"
[user-agent]
crawler-name = "TestCrawler"
crawler-version = "2.1"
contact-url = "https://example.com/bot"
contact-email = "ops@example.com"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.user_agent.header_value(),
            "TestCrawler/2.1 (+https://example.com/bot; ops@example.com)"
        );
    }
}
