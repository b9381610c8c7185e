use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
///
/// Fetch failures are deliberately *not* represented here: a single
/// unreachable article must never abort a worker, so `fetcher::FetchError`
/// is absorbed into the `ArticleRecord` as data instead of being raised.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization/Deserialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Queueing system error: {0}")]
    Queue(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

// redis::RedisError and mongodb::error::Error are mapped to strings at the
// boundary so the core never has to carry the client crates in its signatures.
impl From<redis::RedisError> for PipelineError {
    fn from(err: redis::RedisError) -> Self {
        PipelineError::Queue(err.to_string())
    }
}

impl From<mongodb::error::Error> for PipelineError {
    fn from(err: mongodb::error::Error) -> Self {
        PipelineError::Store(err.to_string())
    }
}
