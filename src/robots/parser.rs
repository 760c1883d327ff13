//! Robots.txt policy representation
//!
//! Wraps the robotstxt crate's matcher for allow/disallow decisions and adds
//! a hand-rolled scan for the `Crawl-delay` directive, which the crate does
//! not expose.

use chrono::{DateTime, Utc};
use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one domain
///
/// An empty content string means no restrictions. Policies are never
/// refreshed within a process lifetime; `fetched_at` records when the rules
/// were obtained.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content (empty string means allow all)
    content: String,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            fetched_at: Utc::now(),
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// Used when robots.txt cannot be fetched: a missing or unreachable
    /// robots.txt imposes no restrictions.
    pub fn permissive() -> Self {
        Self::from_content("")
    }

    /// Checks whether a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Returns the crawl delay in seconds for the given user agent
    ///
    /// The directive applies to the preceding `User-agent` group. A group
    /// naming the crawler takes precedence over the `*` wildcard group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.content.is_empty() {
            return None;
        }

        let agent = user_agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_group_body = false;
        let mut agent_delay: Option<f64> = None;
        let mut wildcard_delay: Option<f64> = None;

        for line in self.content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // Consecutive User-agent lines form one group; a line
                    // after any other directive starts a new group.
                    if in_group_body {
                        group_agents.clear();
                        in_group_body = false;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_group_body = true;
                    if let Ok(delay) = value.parse::<f64>() {
                        if group_agents
                            .iter()
                            .any(|ua| ua != "*" && agent.contains(ua.as_str()))
                        {
                            agent_delay = agent_delay.or(Some(delay));
                        } else if group_agents.iter().any(|ua| ua == "*") {
                            wildcard_delay = wildcard_delay.or(Some(delay));
                        }
                    }
                }
                _ => {
                    in_group_body = true;
                }
            }
        }

        agent_delay.or(wildcard_delay)
    }
}
