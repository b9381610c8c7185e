//! Durable task queue seam.
//!
//! The broker is an external collaborator: the core only relies on the four
//! operations below and their atomicity guarantees (single delivery per item,
//! atomic set-add). `RedisQueue` is the concrete client; tests substitute an
//! in-memory implementation.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::warn;

use crate::data_model::TaskRecord;
use crate::error::Result;

/// One dequeued task. The raw payload rides along so the broker client can
/// identify the exact queue entry again when it is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub task: TaskRecord,
    pub payload: String,
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Appends a task to the queue.
    async fn enqueue(&self, task: &TaskRecord) -> Result<()>;

    /// Takes the next task, blocking up to `wait` when the queue is empty.
    /// Delivered items stay owned by the broker until [`ack`](Self::ack).
    async fn dequeue(&self, wait: Duration) -> Result<Option<Delivery>>;

    /// Removes a delivered entry for good. Only called after the article has
    /// been durably upserted; skipping it makes the entry redeliverable.
    async fn ack(&self, delivery: &Delivery) -> Result<()>;

    /// Atomically records `id` in the published set, returning whether it was
    /// new. This is the sole idempotency check for publication; there is no
    /// separate read-then-write.
    async fn set_add(&self, id: &str) -> Result<bool>;
}

/// Redis-backed queue: RPUSH onto a list, BLMOVE into a per-queue processing
/// list on dequeue, LREM from the processing list on ack, SADD for the
/// published set.
pub struct RedisQueue {
    client: redis::Client,
    queue: String,
    processing_queue: String,
    published_set: String,
}

impl RedisQueue {
    pub fn new(client: redis::Client, queue: &str, published_set: &str) -> Self {
        RedisQueue {
            client,
            queue: queue.to_string(),
            processing_queue: format!("{queue}:processing"),
            published_set: published_set.to_string(),
        }
    }

    // Blocking commands must not share a multiplexed connection with the
    // other operations, so every call gets its own.
    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl TaskQueue for RedisQueue {
    async fn enqueue(&self, task: &TaskRecord) -> Result<()> {
        let payload = serde_json::to_string(task)?;
        let mut con = self.connection().await?;
        let _: () = con.rpush(&self.queue, payload).await?;
        Ok(())
    }

    async fn dequeue(&self, wait: Duration) -> Result<Option<Delivery>> {
        let mut con = self.connection().await?;
        let payload: Option<String> = redis::cmd("BLMOVE")
            .arg(&self.queue)
            .arg(&self.processing_queue)
            .arg("LEFT")
            .arg("RIGHT")
            .arg(wait.as_secs_f64())
            .query_async(&mut con)
            .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<TaskRecord>(&payload) {
            Ok(task) => Ok(Some(Delivery { task, payload })),
            Err(e) => {
                // A malformed entry would be redelivered forever; drop it.
                warn!(error = %e, payload = %payload, "Discarding undecodable queue entry");
                let _: () = con.lrem(&self.processing_queue, 1, &payload).await?;
                Ok(None)
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut con = self.connection().await?;
        let _: () = con
            .lrem(&self.processing_queue, 1, &delivery.payload)
            .await?;
        Ok(())
    }

    async fn set_add(&self, id: &str) -> Result<bool> {
        let mut con = self.connection().await?;
        let added: i64 = con.sadd(&self.published_set, id).await?;
        Ok(added == 1)
    }
}
