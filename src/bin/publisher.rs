// src/bin/publisher.rs

//! # Publisher Binary
//!
//! The producer side of the article pipeline. Its roles are:
//!
//! 1.  **Loading Tasks**: reads the bounded JSON task list (id, url, source,
//!     category, priority) from the input file.
//!
//! 2.  **Idempotent Publication**: for every task, an atomic set-add against
//!     the durable published set decides whether the task is new; only new
//!     ids are enqueued. Re-running the publisher against the same list never
//!     creates duplicate queue entries.
//!
//! 3.  **Failure Reporting**: any queue/set backend failure aborts the run
//!     with a non-zero exit; there is no partial silent success.
//!
//! Uses `clap` for argument parsing, `redis` for the queue backend,
//! `indicatif` for the publishing progress bar, and `tracing` for logging.
//! Prometheus metrics can optionally be exposed over HTTP.

use clap::Parser;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use article_pipeline::config::publisher::Args;
use article_pipeline::error::Result;
use article_pipeline::publisher_logic::{load_tasks, publish_tasks};
use article_pipeline::queue::RedisQueue;
use article_pipeline::utils::utils::{connect_redis, setup_prometheus_metrics};

fn create_progress_bar(total_items: u64, message: &str, template: &str) -> ProgressBar {
    let pb = if total_items == 0 {
        // Spinner if total is unknown (or 0)
        ProgressBar::new_spinner()
    } else {
        ProgressBar::new(total_items)
    };
    pb.set_message(message.to_string());
    let style = if total_items == 0 {
        ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    } else {
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    };
    pb.set_style(style);
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    if let Err(e) = setup_prometheus_metrics(args.metrics_port).await {
        error!("Failed to start Prometheus metrics endpoint: {}", e);
    }

    info!("Publisher started.");
    info!("Input file: {}", args.input_file);
    info!("Task Queue: {} @ {}", args.task_queue, args.redis_url);
    info!("Published Set: {}", args.published_set);

    let tasks = load_tasks(&args.input_file)?;
    if tasks.is_empty() {
        info!("No tasks to publish. Exiting.");
        return Ok(());
    }

    let client = connect_redis(&args.redis_url).await?;
    let queue = RedisQueue::new(client, &args.task_queue, &args.published_set);

    let template =
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ({per_sec})";
    let publishing_pb = create_progress_bar(tasks.len() as u64, "Publishing tasks", template);

    let publish_start = Instant::now();
    let summary = match publish_tasks(&queue, &tasks, Some(&publishing_pb)).await {
        Ok(summary) => summary,
        Err(e) => {
            publishing_pb.finish_with_message(format!("Publishing failed: {}", e));
            error!("Failed during task publishing: {}", e);
            return Err(e);
        }
    };
    publishing_pb.finish_with_message(format!(
        "Finished publishing {} tasks ({} skipped) in {}",
        summary.published,
        summary.skipped,
        HumanDuration(publish_start.elapsed())
    ));

    info!("--------------------");
    info!("Publishing Summary:");
    info!("  Tasks in input list: {}", tasks.len());
    info!("  Newly enqueued: {}", summary.published);
    info!("  Skipped (already published): {}", summary.skipped);
    info!("--------------------");

    Ok(())
}
