//! In-process stand-ins for both backend contracts.
//!
//! [`LocalDirectory`] answers queries from an in-memory [`UserDirectory`];
//! [`LocalDispatcher`] completes tasks on a timer. Useful offline and in
//! tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::prelude::IndexedRandom;
use tokio::sync::broadcast;
use userdir_core::dataset::UserDirectory;
use userdir_core::filter::FilterCriteria;
use userdir_core::pagination::ResultPage;
use userdir_core::tasks::{DispatchAck, TaskCompletion, DEFAULT_TASK_DELAY_MS, RESULT_TEXTS};
use userdir_core::types::TaskId;
use userdir_core::user::User;
use userdir_events::EventBus;

use crate::error::ClientError;
use crate::service::{DispatchService, QueryService};

/// [`QueryService`] over an in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct LocalDirectory {
    directory: Arc<UserDirectory>,
}

impl LocalDirectory {
    pub fn new(directory: UserDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }
}

#[async_trait]
impl QueryService for LocalDirectory {
    type Record = User;

    async fn query(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage<User>, ClientError> {
        criteria.validate()?;
        Ok(self.directory.query(criteria, page))
    }
}

/// [`DispatchService`] that completes every task after a fixed delay.
pub struct LocalDispatcher {
    completions: Arc<EventBus<TaskCompletion>>,
    delay: Duration,
}

impl LocalDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            completions: Arc::new(EventBus::default()),
            delay,
        }
    }
}

impl Default for LocalDispatcher {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TASK_DELAY_MS))
    }
}

#[async_trait]
impl DispatchService for LocalDispatcher {
    async fn dispatch(&self, task_id: TaskId) -> Result<DispatchAck, ClientError> {
        let completions = Arc::clone(&self.completions);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = RESULT_TEXTS
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or("Analysis Complete");
            completions.publish(TaskCompletion::now(task_id, result));
        });
        tracing::debug!(task_id, "Task dispatched locally");
        Ok(DispatchAck::pending(task_id))
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskCompletion> {
        self.completions.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use userdir_core::tasks::TaskStatus;

    use super::*;

    #[tokio::test]
    async fn local_directory_rejects_invalid_criteria() {
        let service = LocalDirectory::new(UserDirectory::generated(20, 1));
        let err = service
            .query(&FilterCriteria::default().with_age_range(60, 30), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn local_dispatcher_acks_then_completes() {
        let dispatcher = LocalDispatcher::new(Duration::from_millis(5));
        let mut rx = dispatcher.subscribe();

        let ack = dispatcher.dispatch(8).await.unwrap();
        assert_eq!(ack.status, TaskStatus::Pending);

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.task_id, 8);
        assert!(RESULT_TEXTS.contains(&completion.result.as_str()));
    }
}
