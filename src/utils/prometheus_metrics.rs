// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram};

// Metrics from Publisher
pub static TASKS_PUBLISHED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "publisher_tasks_published_total",
        "Total number of tasks newly enqueued."
    )
    .expect("Failed to register TASKS_PUBLISHED_TOTAL counter")
});

pub static TASKS_SKIPPED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "publisher_tasks_skipped_total",
        "Total number of tasks skipped because their id was already published."
    )
    .expect("Failed to register TASKS_SKIPPED_TOTAL counter")
});

pub static TASK_PUBLISHING_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "publisher_task_publishing_duration_seconds",
        "Histogram of per-task publishing latencies (set-add plus enqueue)."
    )
    .expect("Failed to register TASK_PUBLISHING_DURATION_SECONDS histogram")
});

// Metrics from Consumer
pub static TASKS_PROCESSED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "consumer_tasks_processed_total",
        "Total number of tasks processed and acknowledged."
    )
    .expect("Failed to register consumer_tasks_processed_total counter")
});

pub static FETCH_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "consumer_fetch_failures_total",
        "Total number of tasks whose fetch exhausted all retry attempts."
    )
    .expect("Failed to register consumer_fetch_failures_total counter")
});

pub static CONTENT_REJECTED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "consumer_content_rejected_total",
        "Total number of fetched pages rejected by content validation."
    )
    .expect("Failed to register consumer_content_rejected_total counter")
});

pub static STORE_RETRIES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "consumer_store_retries_total",
        "Total number of upsert attempts retried because the store was unavailable."
    )
    .expect("Failed to register consumer_store_retries_total counter")
});

pub static ACK_ERRORS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "consumer_ack_errors_total",
        "Total number of errors acknowledging queue entries."
    )
    .expect("Failed to register consumer_ack_errors_total counter")
});

pub static TASK_PROCESSING_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "consumer_task_processing_duration_seconds",
        "Histogram of task processing durations (from dequeue to ack)."
    )
    .expect("Failed to register consumer_task_processing_duration_seconds histogram")
});

pub static ACTIVE_PROCESSING_TASKS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "consumer_active_processing_tasks",
        "Number of tasks currently being processed concurrently."
    )
    .expect("Failed to register consumer_active_processing_tasks gauge")
});
