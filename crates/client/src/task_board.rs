//! The task dispatch board.
//!
//! A fixed set of tasks, each dispatched through a [`DispatchService`] and
//! completed at most once by the matching [`TaskCompletion`].

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use userdir_core::tasks::{TaskCompletion, TaskStatus, BOARD_SIZE};
use userdir_core::types::{TaskId, Timestamp};

use crate::error::ClientError;
use crate::service::DispatchService;

/// One task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTask {
    pub id: TaskId,
    pub status: TaskStatus,
    pub result: Option<String>,
    pub completed_at: Option<Timestamp>,
}

impl BoardTask {
    fn idle(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Idle,
            result: None,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskBoard {
    tasks: Vec<BoardTask>,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::with_size(BOARD_SIZE)
    }
}

impl TaskBoard {
    /// A board of tasks `1..=size`, all idle.
    pub fn with_size(size: TaskId) -> Self {
        Self {
            tasks: (1..=size).map(BoardTask::idle).collect(),
        }
    }

    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&BoardTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// No task is pending.
    pub fn is_settled(&self) -> bool {
        self.count(TaskStatus::Pending) == 0
    }

    /// Mark every task pending and dispatch it.
    ///
    /// Subscribe to the service *before* calling this so no completion is
    /// missed. Tasks whose dispatch fails go back to idle; their errors
    /// are returned.
    pub async fn dispatch_all<D>(&mut self, service: &D) -> Vec<(TaskId, ClientError)>
    where
        D: DispatchService + ?Sized,
    {
        for task in &mut self.tasks {
            task.status = TaskStatus::Pending;
            task.result = None;
            task.completed_at = None;
        }

        let mut failures = Vec::new();
        for task in &mut self.tasks {
            if let Err(e) = service.dispatch(task.id).await {
                tracing::warn!(task_id = task.id, error = %e, "Dispatch failed");
                task.status = TaskStatus::Idle;
                failures.push((task.id, e));
            }
        }
        tracing::info!(
            dispatched = self.tasks.len() - failures.len(),
            failed = failures.len(),
            "Board dispatched",
        );
        failures
    }

    /// Complete a pending task. Unknown ids and repeated completions are
    /// ignored; returns whether the board changed.
    pub fn apply(&mut self, completion: &TaskCompletion) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == completion.task_id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.status = TaskStatus::Completed;
                task.result = Some(completion.result.clone());
                task.completed_at = Some(completion.timestamp);
                true
            }
            Some(_) => {
                tracing::debug!(task_id = completion.task_id, "Ignoring completion for a task that is not pending");
                false
            }
            None => {
                tracing::debug!(task_id = completion.task_id, "Ignoring completion for an unknown task");
                false
            }
        }
    }

    /// Apply completions from `receiver` until the board settles or
    /// `timeout` elapses. Returns how many tasks were completed.
    pub async fn await_completions(
        &mut self,
        receiver: &mut broadcast::Receiver<TaskCompletion>,
        timeout: Duration,
    ) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut applied = 0;

        while !self.is_settled() {
            match tokio::time::timeout_at(deadline, receiver.recv()).await {
                Ok(Ok(completion)) => {
                    if self.apply(&completion) {
                        applied += 1;
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(n))) => {
                    tracing::warn!(skipped = n, "Completion receiver lagged");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    tracing::warn!("Completion channel closed");
                    break;
                }
                Err(_) => {
                    tracing::warn!(pending = self.count(TaskStatus::Pending), "Timed out waiting for completions");
                    break;
                }
            }
        }
        applied
    }
}
