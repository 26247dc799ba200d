//! Event-to-socket routing for task completions.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use userdir_core::tasks::ServerMessage;

use crate::engine::TaskEvent;
use crate::ws::WsManager;

/// Delivers task completions to WebSocket clients.
///
/// Completions with an origin go to that connection only; completions of
/// REST dispatches are broadcast to every connected client.
pub struct CompletionRouter {
    ws_manager: Arc<WsManager>,
}

impl CompletionRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](userdir_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<TaskEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.route(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Completion router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, completion router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single completion. Returns the number of sockets reached.
    pub async fn route(&self, event: TaskEvent) -> usize {
        let task_id = event.completion.task_id;
        let json = match serde_json::to_string(&ServerMessage::TaskResult(event.completion)) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(task_id, error = %e, "Failed to serialize task result");
                return 0;
            }
        };
        let msg = Message::Text(json.into());

        match event.origin {
            Some(conn_id) => {
                if self.ws_manager.send_to(&conn_id, msg).await {
                    1
                } else {
                    // Dispatcher disconnected before completion.
                    tracing::debug!(task_id, conn_id = %conn_id, "Dropping result for closed socket");
                    0
                }
            }
            None => self.ws_manager.broadcast(msg).await,
        }
    }
}
