use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use userdir_core::tasks::{parse_client_message, ClientMessage, DispatchAck, ServerMessage};

use crate::engine::TaskJob;
use crate::state::AppState;

/// HTTP handler that upgrades the connection to the task socket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by a spawned sender task plus the inbound loop below.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single task socket after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Answers `dispatch_task` frames with `task_accepted` and queues the task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => handle_text(&state, &conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one inbound text frame.
async fn handle_text(state: &AppState, conn_id: &str, text: &str) {
    let reply = match parse_client_message(text) {
        Ok(ClientMessage::DispatchTask { task_id: 0 }) => {
            tracing::debug!(conn_id = %conn_id, "Rejected dispatch of task 0");
            ServerMessage::rejected(0, "task id must be positive")
        }
        Ok(ClientMessage::DispatchTask { task_id }) => {
            let job = TaskJob {
                task_id,
                origin: Some(conn_id.to_string()),
            };
            match state.task_queue.submit(job) {
                Ok(()) => ServerMessage::TaskAccepted(DispatchAck::pending(task_id)),
                Err(e) => ServerMessage::rejected(task_id, e.to_string()),
            }
        }
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Unrecognized client frame");
            ServerMessage::error(format!("unrecognized message: {e}"))
        }
    };

    match serde_json::to_string(&reply) {
        Ok(json) => {
            state.ws_manager.send_to(conn_id, Message::Text(json.into())).await;
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize server frame"),
    }
}
