mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use article_pipeline::fetcher::{fetch_with_retry, FetchError};
use article_pipeline::retry::{with_retry, Retryable, RetryPolicy};

use common::{StubFetcher, StubResponse};

#[derive(Debug)]
enum TestError {
    Transient,
    Permanent,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Transient => write!(f, "transient error"),
            TestError::Permanent => write!(f, "permanent error"),
        }
    }
}

impl Retryable for TestError {
    fn is_retryable(&self) -> bool {
        matches!(self, TestError::Transient)
    }
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        jitter: false,
    }
}

#[tokio::test]
async fn success_needs_a_single_attempt() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let result = with_retry(&fast_policy(3), || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TestError>(42)
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let result = with_retry(&fast_policy(3), || {
        let counter = counter_clone.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Transient)
            } else {
                Ok(42)
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn attempts_are_bounded_by_the_policy() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let result = with_retry(&fast_policy(3), || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>(TestError::Transient)
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(
        counter.load(Ordering::SeqCst),
        3,
        "exactly max_attempts total attempts"
    );
}

#[tokio::test]
async fn permanent_errors_are_never_retried() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let result = with_retry(&fast_policy(3), || {
        let counter = counter_clone.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>(TestError::Permanent)
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhaustion_stays_within_the_delay_budget() {
    let policy = fast_policy(3);
    let start = Instant::now();

    let _result: Result<i32, _> =
        with_retry(&policy, || async { Err::<i32, _>(TestError::Transient) }).await;

    let elapsed = start.elapsed();
    // Two sleeps: 10ms + 20ms. Generous upper bound for CI scheduling noise.
    assert!(
        elapsed >= Duration::from_millis(30),
        "should wait at least 30ms, waited {elapsed:?}"
    );
    assert!(
        elapsed <= policy.max_total_delay() + Duration::from_secs(1),
        "should stay within the budget, waited {elapsed:?}"
    );
}

#[tokio::test]
async fn always_timing_out_url_is_attempted_exactly_max_attempts_times() {
    let fetcher = StubFetcher::new();
    fetcher.respond("http://dead.example", StubResponse::Timeout);

    let result = fetch_with_retry(&fetcher, "http://dead.example", &fast_policy(3)).await;

    assert_eq!(result.unwrap_err(), FetchError::Timeout);
    assert_eq!(fetcher.attempts("http://dead.example"), 3);
}

#[tokio::test]
async fn terminal_http_status_fails_on_the_first_attempt() {
    let fetcher = StubFetcher::new();
    fetcher.respond("http://gone.example", StubResponse::Status(404));

    let result = fetch_with_retry(&fetcher, "http://gone.example", &fast_policy(3)).await;

    assert_eq!(result.unwrap_err(), FetchError::Status(404));
    assert_eq!(fetcher.attempts("http://gone.example"), 1);
}

#[tokio::test]
async fn server_errors_retry_then_surface_the_last_cause() {
    let fetcher = StubFetcher::new();
    fetcher.respond("http://flaky.example", StubResponse::Status(503));

    let result = fetch_with_retry(&fetcher, "http://flaky.example", &fast_policy(2)).await;

    assert_eq!(result.unwrap_err(), FetchError::Status(503));
    assert_eq!(fetcher.attempts("http://flaky.example"), 2);
}
