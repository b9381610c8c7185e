use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::data_model::TaskRecord;
use crate::error::{PipelineError, Result as AppResult};
use crate::queue::TaskQueue;
use crate::utils::prometheus_metrics::*;

/// Counts from one publish run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Tasks newly enqueued.
    pub published: u64,
    /// Tasks skipped because their id was already in the published set.
    pub skipped: u64,
}

/// Loads the bounded task list from a JSON file.
pub fn load_tasks<P: AsRef<Path>>(path: P) -> AppResult<Vec<TaskRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!("cannot read task list {}: {e}", path.display()))
    })?;
    let tasks: Vec<TaskRecord> = serde_json::from_str(&contents).map_err(|e| {
        PipelineError::Config(format!("invalid task list {}: {e}", path.display()))
    })?;
    info!(count = tasks.len(), file = %path.display(), "Loaded task list");
    Ok(tasks)
}

/// Publishes the task list in input order, deduplicating against the durable
/// published set.
///
/// The queue's atomic `set_add` is the sole source of truth: a `true` result
/// is the only thing that triggers an enqueue, so two overlapping publish
/// runs cannot both enqueue the same id. Any queue/set backend failure is
/// fatal to the run and propagated; there is no partial silent success.
pub async fn publish_tasks<Q>(
    queue: &Q,
    tasks: &[TaskRecord],
    progress: Option<&ProgressBar>,
) -> AppResult<PublishSummary>
where
    Q: TaskQueue + ?Sized,
{
    let mut summary = PublishSummary::default();

    for task in tasks {
        if let Some(pb) = progress {
            pb.tick();
        }

        let timer = TASK_PUBLISHING_DURATION_SECONDS.start_timer();
        let was_new = queue.set_add(&task.id).await?;
        if was_new {
            // The id is already in the published set at this point; name it in
            // the error so an operator can repair the set after an abort.
            queue.enqueue(task).await.map_err(|e| {
                PipelineError::Queue(format!(
                    "id '{}' added to published set but enqueue failed: {e}",
                    task.id
                ))
            })?;
            summary.published += 1;
            TASKS_PUBLISHED_TOTAL.inc();
            if let Some(pb) = progress {
                pb.inc(1);
            }
            debug!(task_id = %task.id, priority = task.priority, "Published task");
        } else {
            summary.skipped += 1;
            TASKS_SKIPPED_TOTAL.inc();
            debug!(task_id = %task.id, "Task already published, skipping");
        }
        timer.observe_duration();
    }

    info!(
        published = summary.published,
        skipped = summary.skipped,
        "Publishing complete"
    );
    Ok(summary)
}
