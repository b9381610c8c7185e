// --- Command-Line Arguments Struct ---
// Lives in the library so argument parsing is covered by integration tests.
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON task-list file
    #[arg(short, long, default_value = "data/articles.json")]
    pub input_file: String,

    /// Redis connection string (e.g., redis://127.0.0.1:6379)
    #[arg(short, long, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Name of the queue to publish tasks to
    #[arg(short = 'q', long, default_value = "article_queue")]
    pub task_queue: String,

    /// Name of the set tracking already-published task ids
    #[arg(long, default_value = "published_articles")]
    pub published_set: String,

    /// Optional: Port for the Prometheus metrics HTTP endpoint
    #[arg(long)]
    pub metrics_port: Option<u16>,
}
