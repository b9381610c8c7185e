use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Redis connection string (e.g., redis://127.0.0.1:6379)
    #[arg(short, long, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Name of the queue to consume tasks from
    #[arg(short = 'q', long, default_value = "article_queue")]
    pub task_queue: String,

    /// Name of the set tracking already-published task ids
    #[arg(long, default_value = "published_articles")]
    pub published_set: String,

    /// MongoDB connection string
    #[arg(short, long, default_value = "mongodb://127.0.0.1:27017")]
    pub mongo_url: String,

    /// MongoDB database holding the article collection
    #[arg(long, default_value = "articles_db")]
    pub mongo_db: String,

    /// MongoDB collection articles are upserted into
    #[arg(long, default_value = "articles")]
    pub mongo_collection: String,

    /// Number of concurrent consumer workers
    #[arg(short = 'w', long, default_value_t = 2)]
    pub workers: usize,

    /// Path to the scrape configuration YAML file; defaults apply when omitted
    #[arg(short = 'c', long)]
    pub scrape_config: Option<PathBuf>,

    /// Optional: Port for the Prometheus metrics HTTP endpoint
    #[arg(long)]
    pub metrics_port: Option<u16>,
}
