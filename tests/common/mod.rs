#![allow(dead_code)] // not every test binary uses every helper

// Shared in-memory doubles for the external collaborators: queue, store and
// fetch capability. They honor the same atomicity contracts the real
// backends provide (single delivery per item, atomic set-add, upsert by id).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use article_pipeline::data_model::{ArticleRecord, TaskRecord};
use article_pipeline::error::{PipelineError, Result};
use article_pipeline::fetcher::{FetchError, FetchedPage, PageFetcher};
use article_pipeline::queue::{Delivery, TaskQueue};
use article_pipeline::store::ArticleStore;

#[derive(Default)]
struct QueueState {
    ready: VecDeque<String>,
    processing: Vec<String>,
    published: HashSet<String>,
}

#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready_len(&self) -> usize {
        self.state.lock().unwrap().ready.len()
    }

    pub fn processing_len(&self) -> usize {
        self.state.lock().unwrap().processing.len()
    }

    pub fn published_len(&self) -> usize {
        self.state.lock().unwrap().published.len()
    }

    /// Ids of the ready entries, in queue order.
    pub fn ready_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .ready
            .iter()
            .map(|payload| {
                serde_json::from_str::<TaskRecord>(payload)
                    .expect("queue payload decodes")
                    .id
            })
            .collect()
    }
}

#[async_trait]
impl TaskQueue for InMemoryQueue {
    async fn enqueue(&self, task: &TaskRecord) -> Result<()> {
        let payload = serde_json::to_string(task)?;
        self.state.lock().unwrap().ready.push_back(payload);
        Ok(())
    }

    async fn dequeue(&self, wait: Duration) -> Result<Option<Delivery>> {
        let deadline = std::time::Instant::now() + wait;
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(payload) = state.ready.pop_front() {
                    state.processing.push(payload.clone());
                    let task: TaskRecord = serde_json::from_str(&payload)?;
                    return Ok(Some(Delivery { task, payload }));
                }
            }
            if std::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(index) = state
            .processing
            .iter()
            .position(|payload| payload == &delivery.payload)
        {
            state.processing.remove(index);
        }
        Ok(())
    }

    async fn set_add(&self, id: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().published.insert(id.to_string()))
    }
}

/// Queue whose set operations work but whose list backend is down, so an id
/// can land in the published set without a matching queue entry.
#[derive(Default)]
pub struct EnqueueFailingQueue {
    published: Mutex<HashSet<String>>,
}

impl EnqueueFailingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_len(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl TaskQueue for EnqueueFailingQueue {
    async fn enqueue(&self, _task: &TaskRecord) -> Result<()> {
        Err(PipelineError::Queue("queue list unavailable".into()))
    }

    async fn dequeue(&self, _wait: Duration) -> Result<Option<Delivery>> {
        Ok(None)
    }

    async fn ack(&self, _delivery: &Delivery) -> Result<()> {
        Ok(())
    }

    async fn set_add(&self, id: &str) -> Result<bool> {
        Ok(self.published.lock().unwrap().insert(id.to_string()))
    }
}

/// Queue whose backend is unreachable; every operation fails.
pub struct UnreachableQueue;

#[async_trait]
impl TaskQueue for UnreachableQueue {
    async fn enqueue(&self, _task: &TaskRecord) -> Result<()> {
        Err(PipelineError::Queue("connection refused".into()))
    }

    async fn dequeue(&self, _wait: Duration) -> Result<Option<Delivery>> {
        Err(PipelineError::Queue("connection refused".into()))
    }

    async fn ack(&self, _delivery: &Delivery) -> Result<()> {
        Err(PipelineError::Queue("connection refused".into()))
    }

    async fn set_add(&self, _id: &str) -> Result<bool> {
        Err(PipelineError::Queue("connection refused".into()))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    docs: Mutex<HashMap<String, ArticleRecord>>,
    fail_remaining: AtomicU32,
    upsert_calls: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` upserts fail with a store error.
    pub fn fail_next_upserts(&self, count: u32) {
        self.fail_remaining.store(count, Ordering::SeqCst);
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<ArticleRecord> {
        self.docs.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn upsert(&self, article: &ArticleRecord) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remaining.load(Ordering::SeqCst) > 0 {
            self.fail_remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(PipelineError::Store("store unavailable".into()));
        }
        self.docs
            .lock()
            .unwrap()
            .insert(article.id.clone(), article.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub enum StubResponse {
    Page(&'static str),
    PageWithTitle(&'static str, &'static str),
    Timeout,
    Status(u16),
}

/// Fetch capability stub keyed by URL; counts attempts per URL so retry
/// bounds can be asserted.
#[derive(Default)]
pub struct StubFetcher {
    responses: Mutex<HashMap<String, StubResponse>>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: StubResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn attempts(&self, url: &str) -> u32 {
        self.attempts.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_page(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(StubResponse::Page(text)) => Ok(FetchedPage {
                title: None,
                text: text.to_string(),
            }),
            Some(StubResponse::PageWithTitle(title, text)) => Ok(FetchedPage {
                title: Some(title.to_string()),
                text: text.to_string(),
            }),
            Some(StubResponse::Timeout) => Err(FetchError::Timeout),
            Some(StubResponse::Status(code)) => Err(FetchError::Status(code)),
            None => Err(FetchError::Status(404)),
        }
    }
}

pub fn task(id: &str, url: &str) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        url: url.to_string(),
        source: "test-suite".to_string(),
        category: "testing".to_string(),
        priority: 0,
    }
}
