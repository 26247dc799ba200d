//! Task socket adapter.
//!
//! [`SocketDispatcher`] keeps one WebSocket to the backend's `/api/ws`
//! endpoint. A background task owns the socket: it writes queued
//! `dispatch_task` frames, answers waiting dispatch calls from
//! `task_accepted` frames and task-scoped `error` frames, publishes `task_result` frames on an [`EventBus`], and
//! reconnects with backoff when the socket drops.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use userdir_core::tasks::{
    parse_server_message, ClientMessage, DispatchAck, ServerMessage, TaskCompletion,
};
use userdir_core::types::TaskId;
use userdir_events::EventBus;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::reconnect::{reconnect_loop, ReconnectConfig};
use crate::service::DispatchService;

/// A live task socket.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Dispatch calls waiting for their `task_accepted` frame (or a rejection),
/// per task id.
type AckWaiters =
    Arc<Mutex<HashMap<TaskId, VecDeque<oneshot::Sender<Result<DispatchAck, ClientError>>>>>>;

/// Open a WebSocket to `url`.
pub async fn open_socket(url: &str) -> Result<WsStream, ClientError> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::Transport(format!("Failed to connect to {url}: {e}")))?;
    Ok(stream)
}

/// [`DispatchService`] over the backend task socket.
pub struct SocketDispatcher {
    outbound: mpsc::UnboundedSender<String>,
    completions: Arc<EventBus<TaskCompletion>>,
    waiters: AckWaiters,
    ack_timeout: Duration,
    cancel: CancellationToken,
    task_handle: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for SocketDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketDispatcher")
            .field("ack_timeout", &self.ack_timeout)
            .finish_non_exhaustive()
    }
}

impl SocketDispatcher {
    /// Connect to `config.ws_url` with the default reconnect policy.
    ///
    /// The first connection attempt is made eagerly so a wrong URL fails
    /// here rather than on the first dispatch.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::connect_with(config, ReconnectConfig::default()).await
    }

    pub async fn connect_with(
        config: &ClientConfig,
        reconnect: ReconnectConfig,
    ) -> Result<Self, ClientError> {
        let stream = open_socket(&config.ws_url).await?;
        tracing::info!(url = %config.ws_url, "Task socket connected");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let completions = Arc::new(EventBus::default());
        let waiters = AckWaiters::default();
        let cancel = CancellationToken::new();

        let connection = Connection {
            url: config.ws_url.clone(),
            outbound_rx,
            completions: Arc::clone(&completions),
            waiters: Arc::clone(&waiters),
            reconnect,
            cancel: cancel.clone(),
        };
        let task_handle = tokio::spawn(connection.run(stream));

        Ok(Self {
            outbound,
            completions,
            waiters,
            ack_timeout: config.request_timeout,
            cancel,
            task_handle,
        })
    }

    /// Close the socket and wait up to 5 seconds for the connection task.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task_handle).await;
        tracing::info!("Task socket shut down");
    }
}

#[async_trait]
impl DispatchService for SocketDispatcher {
    async fn dispatch(&self, task_id: TaskId) -> Result<DispatchAck, ClientError> {
        let frame = serde_json::to_string(&ClientMessage::DispatchTask { task_id })?;

        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .await
            .entry(task_id)
            .or_default()
            .push_back(tx);

        self.outbound
            .send(frame)
            .map_err(|_| ClientError::Transport("task socket is closed".into()))?;

        match tokio::time::timeout(self.ack_timeout, rx).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(_)) => Err(ClientError::Transport(
                "task socket dropped before the dispatch was acknowledged".into(),
            )),
            Err(_) => Err(ClientError::Transport(format!(
                "no acknowledgement for task {task_id} within {:?}",
                self.ack_timeout
            ))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskCompletion> {
        self.completions.subscribe()
    }
}

/// State owned by the background connection task.
struct Connection {
    url: String,
    outbound_rx: mpsc::UnboundedReceiver<String>,
    completions: Arc<EventBus<TaskCompletion>>,
    waiters: AckWaiters,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
}

impl Connection {
    /// Core loop: pump frames -> reconnect -> pump again.
    ///
    /// Runs until cancelled or until the dispatcher is dropped.
    async fn run(mut self, stream: WsStream) {
        let mut stream = stream;
        loop {
            if !self.pump(stream).await {
                return;
            }

            // Waiters whose frames may have been lost fail instead of timing out.
            let abandoned: usize = self.waiters.lock().await.drain().map(|(_, q)| q.len()).sum();
            tracing::warn!(url = %self.url, abandoned, "Task socket lost, entering reconnect loop");

            match reconnect_loop(&self.url, &self.reconnect, &self.cancel).await {
                Some(next) => stream = next,
                None => return,
            }
        }
    }

    /// Move frames until the socket drops. Returns `false` when the
    /// connection should not be re-established.
    async fn pump(&mut self, stream: WsStream) -> bool {
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return false;
                }
                frame = self.outbound_rx.recv() => match frame {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            tracing::warn!(error = %e, "Failed to write task frame");
                            return true;
                        }
                    }
                    None => {
                        tracing::debug!("Dispatcher dropped, closing task socket");
                        let _ = sink.close().await;
                        return false;
                    }
                },
                msg = source.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Task socket closed by server");
                        return true;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Task socket receive error");
                        return true;
                    }
                    None => return true,
                },
            }
        }
    }

    /// Hand `answer` to the oldest dispatch call waiting on `task_id`.
    async fn answer_waiter(
        &self,
        task_id: TaskId,
        answer: Result<DispatchAck, ClientError>,
    ) -> bool {
        let mut waiters = self.waiters.lock().await;
        let waiter = waiters.get_mut(&task_id).and_then(VecDeque::pop_front);
        if waiters.get(&task_id).is_some_and(VecDeque::is_empty) {
            waiters.remove(&task_id);
        }
        match waiter {
            Some(tx) => {
                let _ = tx.send(answer);
                true
            }
            None => false,
        }
    }

    async fn handle_frame(&self, text: &str) {
        match parse_server_message(text) {
            Ok(ServerMessage::TaskAccepted(ack)) => {
                if !self.answer_waiter(ack.task_id, Ok(ack)).await {
                    tracing::debug!(task_id = ack.task_id, "Unsolicited task_accepted");
                }
            }
            Ok(ServerMessage::TaskResult(completion)) => {
                tracing::debug!(task_id = completion.task_id, result = %completion.result, "Task result received");
                self.completions.publish(completion);
            }
            Ok(ServerMessage::Error {
                task_id: Some(task_id),
                message,
            }) => {
                tracing::warn!(task_id, message = %message, "Server rejected a dispatch");
                self.answer_waiter(task_id, Err(ClientError::Rejected { task_id, message }))
                    .await;
            }
            Ok(ServerMessage::Error {
                task_id: None,
                message,
            }) => {
                tracing::warn!(message = %message, "Server rejected a task frame");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unrecognized server frame");
            }
        }
    }
}
