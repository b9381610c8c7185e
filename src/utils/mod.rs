pub mod prometheus_metrics;
pub mod utils;
