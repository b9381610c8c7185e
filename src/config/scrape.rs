//! Scrape tuning knobs, loadable from a YAML file.
//!
//! Every field carries a default matching the design values, so an empty or
//! partial file (or no file at all) yields a working configuration.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::retry::RetryPolicy;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// Timeout and retry settings for the network fetch.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Hard per-attempt timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub jitter: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout_secs: 10,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            jitter: true,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_backoff_ms),
            max_delay: Duration::from_millis(self.max_backoff_ms),
            jitter: self.jitter,
        }
    }
}

/// Content validation thresholds.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// Minimum trimmed character count before a page counts as content.
    pub min_chars: usize,
    /// Stored body size cap, in characters.
    pub max_body_chars: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            min_chars: 20,
            max_body_chars: 5_000,
        }
    }
}

/// Loads and parses the scrape configuration YAML file.
pub fn load_scrape_config<P: AsRef<Path>>(path: P) -> Result<ScrapeConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&contents).map_err(|e| {
        PipelineError::Config(format!(
            "failed to parse scrape config {}: {e}",
            path.as_ref().display()
        ))
    })
}
