//! Client for the coordinator's versioned HTTP API
//!
//! The coordinator owns the URL frontier, deduplication, and task state; this
//! node only leases tasks, reports outcomes, and submits what it finds. All
//! calls are plain JSON over HTTP and a non-2xx response surfaces as a
//! [`CoordinatorError::Status`].

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A crawl task leased from the coordinator
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlTask {
    pub id: i64,
    pub url: String,
    pub priority: i32,
    pub domain: String,
    pub status: String,
}

/// Content payload submitted after a successful extraction
#[derive(Debug, Serialize)]
pub struct ContentSubmission {
    pub url_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One discovered link in a batch submission
#[derive(Debug, Serialize)]
pub struct LinkSubmission {
    pub url: String,
    pub priority: u8,
}

#[derive(Debug, Serialize)]
struct LinkBatch<'a> {
    source_url: &'a str,
    links: &'a [LinkSubmission],
}

#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    error_message: &'a str,
}

/// Acknowledgement for a content submission
#[derive(Debug, Deserialize)]
pub struct ContentReceipt {
    pub id: i64,
    pub status: String,
}

/// Acknowledgement for a link batch; duplicates against the frontier are
/// skipped coordinator-side
#[derive(Debug, Deserialize)]
pub struct LinkReceipt {
    pub added: u64,
    pub skipped: u64,
    pub total: u64,
}

/// Errors talking to the coordinator
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("coordinator returned HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },
}

/// HTTP client for the coordinator API
pub struct CoordinatorClient {
    base_url: String,
    api_version: String,
    client: Client,
}

impl CoordinatorClient {
    /// Creates a client for the given coordinator
    ///
    /// # Arguments
    ///
    /// * `base_url` - coordinator base URL, trailing slashes ignored
    /// * `api_version` - API version segment, e.g. `"v1"`
    pub fn new(base_url: &str, api_version: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, self.api_version, path)
    }

    /// Leases up to `limit` tasks from the frontier
    pub async fn fetch_next(&self, limit: u32) -> Result<Vec<CrawlTask>, CoordinatorError> {
        let endpoint = self.endpoint("urls");
        let response = self
            .client
            .get(&endpoint)
            .query(&[("limit", limit)])
            .send()
            .await?;
        let response = check_status(response, &endpoint)?;
        Ok(response.json().await?)
    }

    /// Reports that a task is being crawled
    pub async fn mark_crawling(&self, task_id: i64) -> Result<(), CoordinatorError> {
        self.post_status(task_id, "crawling").await
    }

    /// Reports that a task finished successfully
    pub async fn mark_completed(&self, task_id: i64) -> Result<(), CoordinatorError> {
        self.post_status(task_id, "completed").await
    }

    /// Reports that a task failed, with a human-readable reason
    pub async fn mark_failed(
        &self,
        task_id: i64,
        error_message: &str,
    ) -> Result<(), CoordinatorError> {
        let endpoint = self.endpoint(&format!("urls/{}/failed", task_id));
        let response = self
            .client
            .post(&endpoint)
            .json(&FailureReport { error_message })
            .send()
            .await?;
        check_status(response, &endpoint)?;
        Ok(())
    }

    /// Submits extracted content for indexing
    pub async fn submit_content(
        &self,
        submission: &ContentSubmission,
    ) -> Result<ContentReceipt, CoordinatorError> {
        let endpoint = self.endpoint("content");
        let response = self
            .client
            .post(&endpoint)
            .json(submission)
            .send()
            .await?;
        let response = check_status(response, &endpoint)?;
        Ok(response.json().await?)
    }

    /// Submits a batch of discovered links to the frontier
    pub async fn submit_links(
        &self,
        source_url: &str,
        links: &[LinkSubmission],
    ) -> Result<LinkReceipt, CoordinatorError> {
        let endpoint = self.endpoint("links");
        let response = self
            .client
            .post(&endpoint)
            .json(&LinkBatch { source_url, links })
            .send()
            .await?;
        let response = check_status(response, &endpoint)?;
        Ok(response.json().await?)
    }

    async fn post_status(&self, task_id: i64, status: &str) -> Result<(), CoordinatorError> {
        let endpoint = self.endpoint(&format!("urls/{}/{}", task_id, status));
        let response = self.client.post(&endpoint).send().await?;
        check_status(response, &endpoint)?;
        Ok(())
    }
}

fn check_status(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, CoordinatorError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(CoordinatorError::Status {
            status: response.status().as_u16(),
            endpoint: endpoint.to_string(),
        })
    }
}
