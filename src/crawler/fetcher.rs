//! HTTP page fetcher
//!
//! Thin wrapper around reqwest with the crawler's User-Agent, configured
//! timeouts, and automatic redirect following. Errors are classified so the
//! orchestrator can report a meaningful failure reason per task.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Response body
    pub body: String,
}

/// Classified fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("{message}")]
    Other { message: String },
}

/// HTTP transport for page fetches
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Builds a fetcher with the given User-Agent and request timeout
    ///
    /// Redirects are followed automatically (reqwest's default limit);
    /// gzip and brotli responses are decompressed transparently.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Fetches a URL
    ///
    /// Non-2xx responses and transport failures are errors; the orchestrator
    /// decides what they mean for the task.
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Err(classify(url, e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Other {
            message: error.to_string(),
        }
    }
}
