//! Exponential backoff with jitter for transient failures.
//!
//! The delay schedule is a pure function of (attempt number, base delay,
//! cap), so the policy can be unit-tested without clocks; jitter is applied
//! only at sleep time to avoid synchronized retry storms across workers.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Classifies an error as transient (worth retrying) or terminal.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. 1 means no retries.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after the given 1-based attempt: the base
    /// delay doubled per failed attempt, capped at `max_delay`. No jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let scaled = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(exponent));
        scaled.min(self.max_delay)
    }

    /// `delay_for` plus up to 25% uniform random jitter when enabled.
    pub fn jittered_delay_for(&self, attempt: u32) -> Duration {
        let base = self.delay_for(attempt);
        if !self.jitter {
            return base;
        }
        let factor: f64 = rand::thread_rng().gen_range(0.0..=0.25);
        base + Duration::from_secs_f64(base.as_secs_f64() * factor)
    }

    /// Upper bound on the time spent sleeping between attempts, jitter
    /// included. Useful for asserting the total delay budget.
    pub fn max_total_delay(&self) -> Duration {
        let mut total = Duration::ZERO;
        for attempt in 1..self.max_attempts {
            let base = self.delay_for(attempt);
            total += base + Duration::from_secs_f64(base.as_secs_f64() * 0.25);
        }
        total
    }
}

/// Drives an async operation through the retry policy.
///
/// Retries only while the error reports itself transient and attempts
/// remain; the last error is returned to the caller as data once the
/// budget is exhausted.
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.jittered_delay_for(attempt);
                warn!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(error = %e, attempts = attempt, "Retry attempts exhausted");
                }
                return Err(e);
            }
        }
    }
}
