//! Background task worker.
//!
//! Jobs arrive over an unbounded channel and run concurrently; each one
//! sleeps for the configured delay, picks a result text and publishes the
//! completion. Nothing is persisted: a restart forgets in-flight tasks.

use std::sync::Arc;
use std::time::Duration;

use rand::prelude::IndexedRandom;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use userdir_core::tasks::{TaskCompletion, RESULT_TEXTS};
use userdir_core::types::TaskId;
use userdir_events::EventBus;

use crate::error::{AppError, AppResult};

/// A task waiting to be processed.
#[derive(Debug, Clone)]
pub struct TaskJob {
    pub task_id: TaskId,
    /// Connection the dispatch came from; `None` for REST dispatches.
    pub origin: Option<String>,
}

/// Published when a task finishes.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Copied from [`TaskJob::origin`].
    pub origin: Option<String>,
    pub completion: TaskCompletion,
}

/// Cloneable submission handle held in `AppState`.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<TaskJob>,
}

impl TaskQueue {
    /// Queue a job. Fails only once the worker has stopped.
    pub fn submit(&self, job: TaskJob) -> AppResult<()> {
        let task_id = job.task_id;
        self.sender
            .send(job)
            .map_err(|_| AppError::Unavailable("task worker is not running".into()))?;
        tracing::debug!(task_id, "Task queued");
        Ok(())
    }
}

/// Background task worker.
pub struct TaskWorker {
    receiver: mpsc::UnboundedReceiver<TaskJob>,
    event_bus: Arc<EventBus<TaskEvent>>,
    delay: Duration,
}

impl TaskWorker {
    /// Create a worker and the queue that feeds it.
    pub fn new(event_bus: Arc<EventBus<TaskEvent>>, delay: Duration) -> (Self, TaskQueue) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = Self {
            receiver,
            event_bus,
            delay,
        };
        (worker, TaskQueue { sender })
    }

    /// Run the worker loop until the cancellation token is triggered or
    /// every queue handle is dropped. Jobs still sleeping are abandoned.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut in_flight = JoinSet::new();
        tracing::info!(delay_ms = self.delay.as_millis() as u64, "Task worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(abandoned = in_flight.len(), "Task worker shutting down");
                    break;
                }
                job = self.receiver.recv() => {
                    let Some(job) = job else {
                        tracing::info!("Task queue closed, worker exiting");
                        break;
                    };
                    in_flight.spawn(complete(job, Arc::clone(&self.event_bus), self.delay));
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Task job panicked");
                    }
                }
            }
        }

        in_flight.abort_all();
    }
}

/// Wait out the delay, then publish the completion.
async fn complete(job: TaskJob, event_bus: Arc<EventBus<TaskEvent>>, delay: Duration) {
    tokio::time::sleep(delay).await;

    let completion = TaskCompletion::now(job.task_id, pick_result());
    tracing::info!(
        task_id = job.task_id,
        result = %completion.result,
        "Task completed",
    );
    event_bus.publish(TaskEvent {
        origin: job.origin,
        completion,
    });
}

fn pick_result() -> &'static str {
    RESULT_TEXTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Analysis Complete")
}
