// src/config.rs

pub mod consumer;
pub mod publisher;
pub mod scrape;

pub use scrape::{load_scrape_config, ContentConfig, FetchConfig, ScrapeConfig};
