use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work published to the task queue: a URL to fetch plus its
/// provenance metadata. `id` is the stable unique identifier derived from
/// the source data and must never change once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub url: String,
    pub source: String,
    pub category: String,
    /// Informational only. Tasks are published in input order; no scheduling
    /// policy is derived from this field.
    #[serde(default)]
    pub priority: i64,
}

/// Outcome of content enrichment for one fetched page.
///
/// Exactly one of body/error survives into the persisted record; keeping the
/// dichotomy as a tagged variant makes it impossible to build a record with
/// both (or neither) set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Content { body: String, word_count: u64 },
    Rejected { error: String },
}

/// The persisted, enriched representation of one task's outcome.
///
/// Document shape at the storage boundary; field order matches the stored
/// document: id, url, source, category, priority, title, body, error,
/// scraped_at, processed_at, word_count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub priority: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub error: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
    pub word_count: u64,
}

impl ArticleRecord {
    /// Flattens a task plus its enrichment outcome into the storage shape.
    /// This is the only place the body/error optionals are produced, so the
    /// mutual-exclusivity invariant holds by construction and `word_count`
    /// can never drift from `body`.
    pub fn assemble(
        task: &TaskRecord,
        title: Option<String>,
        enrichment: Enrichment,
        scraped_at: DateTime<Utc>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        let (body, error, word_count) = match enrichment {
            Enrichment::Content { body, word_count } => (Some(body), None, word_count),
            Enrichment::Rejected { error } => (None, Some(error), 0),
        };

        ArticleRecord {
            id: task.id.clone(),
            url: task.url.clone(),
            source: task.source.clone(),
            category: task.category.clone(),
            priority: task.priority,
            title,
            body,
            error,
            scraped_at,
            processed_at,
            word_count,
        }
    }
}
