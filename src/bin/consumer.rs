// src/bin/consumer.rs

//! # Consumer Binary
//!
//! Runs the worker pool: N workers dequeue article tasks from Redis, fetch
//! the remote content with timeout/retry, enrich it (word count, minimum
//! content length) and upsert the resulting record into MongoDB. The queue
//! entry is acknowledged only after a successful upsert, so a store outage
//! leaves tasks redeliverable. Ctrl-C requests a graceful stop between tasks.

use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use article_pipeline::config::consumer::Args;
use article_pipeline::config::{load_scrape_config, ScrapeConfig};
use article_pipeline::consumer_logic::{run_worker_pool, WorkerOptions};
use article_pipeline::error::Result;
use article_pipeline::fetcher::{HttpFetcher, PageFetcher};
use article_pipeline::queue::RedisQueue;
use article_pipeline::store::MongoStore;
use article_pipeline::utils::utils::{connect_redis, setup_prometheus_metrics};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    if let Err(e) = setup_prometheus_metrics(args.metrics_port).await {
        error!("Failed to start Prometheus metrics endpoint: {}", e);
    }

    info!("Consumer starting.");
    info!(
        "Consuming from queue '{}' @ {}, storing into {}/{}.{}",
        args.task_queue, args.redis_url, args.mongo_url, args.mongo_db, args.mongo_collection
    );
    info!("Workers: {}", args.workers);

    let scrape: ScrapeConfig = match &args.scrape_config {
        Some(path) => {
            info!("Loading scrape configuration from: {}", path.display());
            load_scrape_config(path)?
        }
        None => ScrapeConfig::default(),
    };

    let client = connect_redis(&args.redis_url).await?;
    let queue = Arc::new(RedisQueue::new(
        client,
        &args.task_queue,
        &args.published_set,
    ));
    let store = Arc::new(
        MongoStore::connect(&args.mongo_url, &args.mongo_db, &args.mongo_collection).await?,
    );
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(scrape.fetch.timeout())?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping workers after in-flight tasks");
            let _ = shutdown_tx.send(true);
        }
    });

    run_worker_pool(
        args.workers,
        queue,
        store,
        fetcher,
        WorkerOptions::with_scrape(scrape),
        shutdown_rx,
    )
    .await?;

    info!("Consumer stopped.");
    Ok(())
}
