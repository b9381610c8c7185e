// src/utils/utils.rs

use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::error::Result;
use axum::{http::StatusCode, routing::get, serve, Router};
use prometheus::{gather, Encoder, TextEncoder};
use tokio::net::TcpListener;

/// Connects to Redis with retry, verifying the server answers PING before
/// handing the client back.
pub async fn connect_redis(url: &str) -> Result<redis::Client> {
    let client = redis::Client::open(url).map_err(crate::error::PipelineError::from)?;

    let mut attempts = 0;
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(mut con) => {
                let _: String = redis::cmd("PING").query_async(&mut con).await?;
                info!("Successfully connected to Redis at {}", url);
                return Ok(client);
            }
            Err(e) => {
                attempts += 1;
                error!(
                    attempt = attempts,
                    error = %e,
                    "Failed to connect to Redis. Retrying in 5 seconds..."
                );
                if attempts >= 5 {
                    return Err(e.into());
                }
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

// Axum handler for /metrics
async fn metrics_handler() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&gather(), &mut buffer) {
        error!("Could not encode prometheus metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Could not encode prometheus metrics: {}", e),
        );
    }
    match String::from_utf8(buffer) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => {
            error!("Prometheus metrics UTF-8 error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prometheus metrics UTF-8 error: {}", e),
            )
        }
    }
}

/// Starts the Prometheus metrics endpoint when a port is configured.
pub async fn setup_prometheus_metrics(metrics_port: Option<u16>) -> Result<()> {
    if let Some(port) = metrics_port {
        let app = Router::new().route("/metrics", get(metrics_handler));
        let listener_addr = format!("0.0.0.0:{}", port);
        info!(
            "Metrics endpoint will be available at http://{}/metrics",
            listener_addr
        );

        tokio::spawn(async move {
            match TcpListener::bind(&listener_addr).await {
                Ok(listener) => {
                    if let Err(e) = serve(listener, app).await {
                        error!("Metrics server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to bind metrics server to {}: {}", listener_addr, e);
                }
            }
        });
        Ok(())
    } else {
        info!("Prometheus metrics endpoint not configured (no port specified).");
        Ok(())
    }
}
