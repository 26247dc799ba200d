//! The two backend contracts the client consumes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use userdir_core::filter::FilterCriteria;
use userdir_core::pagination::ResultPage;
use userdir_core::tasks::{DispatchAck, TaskCompletion};
use userdir_core::types::TaskId;
use userdir_core::user::Record;

use crate::error::ClientError;

/// Paginated, filtered search over the directory.
///
/// One call answers one page. Any transport or decode failure is a single
/// error; there are no partial results.
#[async_trait]
pub trait QueryService: Send + Sync {
    type Record: Record + Clone + Send + Sync + 'static;

    async fn query(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage<Self::Record>, ClientError>;
}

#[async_trait]
impl<T: QueryService + ?Sized> QueryService for Arc<T> {
    type Record = T::Record;

    async fn query(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage<Self::Record>, ClientError> {
        (**self).query(criteria, page).await
    }
}

/// Fire-and-forget task submission with asynchronous completions.
///
/// `dispatch` returns as soon as the task is accepted. Each dispatch yields
/// at most one completion on [`subscribe`](Self::subscribe); completions of
/// different tasks arrive in any order.
#[async_trait]
pub trait DispatchService: Send + Sync {
    async fn dispatch(&self, task_id: TaskId) -> Result<DispatchAck, ClientError>;

    /// Completions published after this call.
    fn subscribe(&self) -> broadcast::Receiver<TaskCompletion>;
}
