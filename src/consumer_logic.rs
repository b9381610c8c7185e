// src/consumer_logic.rs

//! Consumer worker: dequeue → fetch → enrich → upsert → ack.
//!
//! Fetch and content failures are absorbed into the persisted record
//! (terminal-but-recorded, never requeued); only a store failure keeps the
//! queue entry unacknowledged so it stays redeliverable. The store's
//! upsert-by-id idempotency makes that at-least-once loop safe.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::ScrapeConfig;
use crate::data_model::{ArticleRecord, Enrichment, TaskRecord};
use crate::enricher::enrich;
use crate::error::{PipelineError, Result};
use crate::fetcher::{fetch_with_retry, FetchError, FetchedPage, PageFetcher};
use crate::queue::{Delivery, TaskQueue};
use crate::store::ArticleStore;
use crate::utils::prometheus_metrics::*;

/// Per-worker knobs beyond the scrape configuration.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub scrape: ScrapeConfig,
    /// Bounded blocking wait for an empty queue.
    pub dequeue_wait: Duration,
    /// Backoff before retrying a delivery whose upsert failed.
    pub store_retry_delay: Duration,
    /// Backoff after a queue error before polling again.
    pub queue_error_delay: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        WorkerOptions {
            scrape: ScrapeConfig::default(),
            dequeue_wait: Duration::from_secs(1),
            store_retry_delay: Duration::from_secs(5),
            queue_error_delay: Duration::from_secs(5),
        }
    }
}

impl WorkerOptions {
    pub fn with_scrape(scrape: ScrapeConfig) -> Self {
        WorkerOptions {
            scrape,
            ..WorkerOptions::default()
        }
    }
}

/// Merges the task with its fetch outcome into the storage shape.
///
/// A fetch failure records the terminal cause; a fetched page goes through
/// content validation, which may still reject it. `processed_at` is stamped
/// here, at assembly time.
pub fn build_article(
    task: &TaskRecord,
    fetched: std::result::Result<FetchedPage, FetchError>,
    scrape: &ScrapeConfig,
    scraped_at: chrono::DateTime<Utc>,
) -> ArticleRecord {
    let (title, enrichment) = match fetched {
        Ok(page) => {
            let enrichment = enrich(Some(&page.text), &scrape.content);
            if matches!(enrichment, Enrichment::Rejected { .. }) {
                CONTENT_REJECTED_TOTAL.inc();
            }
            (page.title, enrichment)
        }
        Err(e) => {
            FETCH_FAILURES_TOTAL.inc();
            (
                None,
                Enrichment::Rejected {
                    error: e.to_string(),
                },
            )
        }
    };

    ArticleRecord::assemble(task, title, enrichment, scraped_at, Utc::now())
}

/// Processes one delivery end to end.
///
/// Returns `Err` only when the upsert failed, in which case the entry has
/// NOT been acknowledged and remains redeliverable. Ack failures after a
/// successful upsert are logged but not propagated; redelivery of an
/// already-stored article is harmless.
pub async fn process_delivery<Q, S>(
    queue: &Q,
    store: &S,
    fetcher: &dyn PageFetcher,
    scrape: &ScrapeConfig,
    delivery: &Delivery,
) -> Result<()>
where
    Q: TaskQueue + ?Sized,
    S: ArticleStore + ?Sized,
{
    ACTIVE_PROCESSING_TASKS.inc();
    let timer = TASK_PROCESSING_DURATION_SECONDS.start_timer();

    let task = &delivery.task;
    let policy = scrape.fetch.retry_policy();
    let fetched = fetch_with_retry(fetcher, &task.url, &policy).await;
    let scraped_at = Utc::now();

    let article = build_article(task, fetched, scrape, scraped_at);
    match &article.error {
        None => debug!(word_count = article.word_count, "Article fetched and enriched"),
        Some(reason) => debug!(%reason, "Recording failed article"),
    }

    let upsert_result = store.upsert(&article).await;
    timer.observe_duration();
    ACTIVE_PROCESSING_TASKS.dec();

    upsert_result?;

    if let Err(e) = queue.ack(delivery).await {
        ACK_ERRORS_TOTAL.inc();
        error!(error = %e, "Failed to ack queue entry after upsert");
    }
    TASKS_PROCESSED_TOTAL.inc();
    Ok(())
}

/// Single worker loop. Stops between tasks when the shutdown flag flips;
/// in-flight work is allowed to finish naturally.
pub async fn run_worker<Q, S>(
    worker_id: usize,
    queue: Arc<Q>,
    store: Arc<S>,
    fetcher: Arc<dyn PageFetcher>,
    options: WorkerOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    Q: TaskQueue + ?Sized,
    S: ArticleStore + ?Sized,
{
    info!(worker_id, "Worker started, waiting for tasks");

    'main: while !*shutdown.borrow() {
        let delivery = match queue.dequeue(options.dequeue_wait).await {
            Ok(Some(delivery)) => delivery,
            Ok(None) => continue,
            Err(e) => {
                error!(worker_id, error = %e, "Error in consumer loop");
                tokio::time::sleep(options.queue_error_delay).await;
                continue;
            }
        };

        let span = info_span!("process_task", worker_id, task_id = %delivery.task.id);
        let completed = async {
            debug!(url = %delivery.task.url, "Processing task");
            loop {
                match process_delivery(
                    queue.as_ref(),
                    store.as_ref(),
                    fetcher.as_ref(),
                    &options.scrape,
                    &delivery,
                )
                .await
                {
                    Ok(()) => return true,
                    Err(e) => {
                        // Not acked; retry the same delivery until the store
                        // comes back or shutdown is requested.
                        STORE_RETRIES_TOTAL.inc();
                        warn!(error = %e, "Upsert failed, entry left unacknowledged");
                        if *shutdown.borrow() {
                            return false;
                        }
                        tokio::time::sleep(options.store_retry_delay).await;
                    }
                }
            }
        }
        .instrument(span)
        .await;

        if !completed {
            info!(worker_id, "Shutdown requested mid-retry; leaving entry for redelivery");
            break 'main;
        }
    }

    info!(worker_id, "Worker stopped");
    Ok(())
}

/// Runs N workers concurrently against the same queue and store. Workers
/// share nothing mutable in-process; all coordination is delegated to the
/// queue's single-delivery and the store's unique-key guarantees.
pub async fn run_worker_pool<Q, S>(
    workers: usize,
    queue: Arc<Q>,
    store: Arc<S>,
    fetcher: Arc<dyn PageFetcher>,
    options: WorkerOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    Q: TaskQueue + ?Sized + 'static,
    S: ArticleStore + ?Sized + 'static,
{
    info!(workers, "Starting worker pool");

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        handles.push(tokio::spawn(run_worker(
            worker_id,
            Arc::clone(&queue),
            Arc::clone(&store),
            Arc::clone(&fetcher),
            options.clone(),
            shutdown.clone(),
        )));
    }

    for handle in futures::future::join_all(handles).await {
        handle.map_err(|e| PipelineError::Unexpected(format!("worker task panicked: {e}")))??;
    }

    info!("Worker pool stopped");
    Ok(())
}
