// Declare the modules that form the library's public API.
// The binaries use them via `use article_pipeline::module_name;`.
pub mod config;
pub mod consumer_logic;
pub mod data_model;
pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod publisher_logic;
pub mod queue;
pub mod retry;
pub mod store;
pub mod utils;

pub use data_model::{ArticleRecord, Enrichment, TaskRecord};
pub use error::{PipelineError, Result};
