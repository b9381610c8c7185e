//! Network fetch with per-attempt timeout and retry.
//!
//! The fetch capability is a trait so workers can be exercised against stub
//! pages in tests; `HttpFetcher` is the real reqwest-backed implementation.
//! HTML-to-text extraction is out of scope here: the fetcher hands back the
//! raw page text plus a best-effort `<title>`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::retry::{with_retry, Retryable, RetryPolicy};

/// User agent sent with every request; some hosts reject unidentified clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex is valid")
});

/// Terminal or per-attempt failure of a single fetch. Returned to the caller
/// as data, never escalated: one unreachable article must not abort the
/// pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    Connect,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Connect => true,
            FetchError::Status(status) => *status == 429 || *status >= 500,
            FetchError::Network(_) => true,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// One successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: Option<String>,
    pub text: String,
}

/// `fetch(url) -> raw text`, failing with a `FetchError` on network or HTTP
/// failure. One call is one attempt; retry lives in [`fetch_with_retry`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> std::result::Result<FetchedPage, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// `timeout` is the hard per-attempt budget, connection time included.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        debug!(%url, "Fetching page");
        let response = self.client.get(url).send().await.map_err(FetchError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let text = response.text().await.map_err(FetchError::from)?;
        Ok(FetchedPage {
            title: extract_title(&text),
            text,
        })
    }
}

/// Fetches with exponential backoff around transient failures. Exhausting the
/// policy yields the last underlying cause.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> std::result::Result<FetchedPage, FetchError> {
    with_retry(policy, || fetcher.fetch_page(url)).await
}

fn extract_title(text: &str) -> Option<String> {
    let captured = TITLE_RE.captures(text)?.get(1)?.as_str().trim().to_string();
    if captured.is_empty() {
        None
    } else {
        Some(captured)
    }
}
