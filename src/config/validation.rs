use crate::config::types::{
    Config, CoordinatorConfig, CrawlerConfig, DiscoveryConfig, LanguageConfig, PolitenessConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_coordinator(&config.coordinator)?;
    validate_crawler(&config.crawler)?;
    validate_user_agent(&config.user_agent)?;
    validate_politeness(&config.politeness)?;
    validate_discovery(&config.discovery)?;
    validate_language(&config.language)?;
    Ok(())
}

fn validate_coordinator(config: &CoordinatorConfig) -> Result<(), ConfigError> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid coordinator base-url: {}", e)))?;

    if config.api_version.is_empty() {
        return Err(ConfigError::Validation(
            "api-version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_politeness(config: &PolitenessConfig) -> Result<(), ConfigError> {
    if config.default_crawl_delay_secs < 0.0 || !config.default_crawl_delay_secs.is_finite() {
        return Err(ConfigError::Validation(format!(
            "default-crawl-delay-secs must be a non-negative number, got {}",
            config.default_crawl_delay_secs
        )));
    }

    if config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "robots-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_discovery(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.max_links_per_page < 1 || config.max_links_per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "max-links-per-page must be between 1 and 100, got {}",
            config.max_links_per_page
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max-depth must be >= 1".to_string(),
        ));
    }

    if config.default_parent_score > 100 || config.min_parent_score > 100 {
        return Err(ConfigError::Validation(
            "parent scores are on a 0-100 scale".to_string(),
        ));
    }

    Ok(())
}

fn validate_language(config: &LanguageConfig) -> Result<(), ConfigError> {
    for code in &config.allowed_languages {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "allowed-languages entries must be 2-letter lowercase codes, got '{}'",
                code
            )));
        }
    }

    Ok(())
}

/// Basic email validation: local@domain with a dot in the domain
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "contact-email '{}' is not a valid email address",
            email
        )))
    }
}
