//! Lifecycle of the task worker and the completion router.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use userdir_events::EventBus;

use super::worker::{TaskEvent, TaskQueue, TaskWorker};
use crate::notifications::CompletionRouter;
use crate::ws::WsManager;

/// How long [`TaskServices::stop`] waits for each background task.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// The running task pipeline: worker -> event bus -> completion router.
///
/// Only this struct and the worker hold the bus, so the router sees the
/// channel close once both are gone, whatever sockets are still open.
pub struct TaskServices {
    queue: TaskQueue,
    event_bus: Arc<EventBus<TaskEvent>>,
    ws_manager: Arc<WsManager>,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
    router: JoinHandle<()>,
}

impl TaskServices {
    /// Spawn the worker and the completion router.
    ///
    /// Cancelling `shutdown` stops the worker. Must be called inside a Tokio
    /// runtime.
    pub fn start(ws_manager: Arc<WsManager>, delay: Duration, shutdown: CancellationToken) -> Self {
        let event_bus = Arc::new(EventBus::default());

        let completion_router = CompletionRouter::new(Arc::clone(&ws_manager));
        let router = tokio::spawn(completion_router.run(event_bus.subscribe()));

        let (worker, queue) = TaskWorker::new(Arc::clone(&event_bus), delay);
        let worker = tokio::spawn(worker.run(shutdown.clone()));

        Self {
            queue,
            event_bus,
            ws_manager,
            shutdown,
            worker,
            router,
        }
    }

    /// Submission handle for `AppState`.
    pub fn queue(&self) -> TaskQueue {
        self.queue.clone()
    }

    /// Completion events as the worker publishes them.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_bus.subscribe()
    }

    /// Stop the worker, close every task socket, then wait for the
    /// completion router to drain.
    ///
    /// Returns `true` if the router exited within the grace period.
    pub async fn stop(self) -> bool {
        let Self {
            event_bus,
            ws_manager,
            shutdown,
            worker,
            router,
            ..
        } = self;

        shutdown.cancel();
        if tokio::time::timeout(STOP_GRACE, worker).await.is_err() {
            tracing::warn!("Task worker did not stop within the grace period");
        }

        let open = ws_manager.connection_count().await;
        tracing::info!(open, "Closing remaining WebSocket connections");
        ws_manager.shutdown_all().await;

        drop(event_bus);
        match tokio::time::timeout(STOP_GRACE, router).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!("Completion router did not drain within the grace period");
                false
            }
        }
    }
}
