//! Registry of open task sockets.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use userdir_core::types::Timestamp;

/// Outbound queue of one socket; drained by that socket's sender task.
pub type Outbox = mpsc::UnboundedSender<Message>;

struct Peer {
    outbox: Outbox,
    connected_at: Timestamp,
}

/// Open task sockets keyed by connection id.
///
/// Shared as `Arc<WsManager>` between the socket handler, the completion
/// router and the heartbeat. Fan-out calls drop peers whose sender task has
/// already gone.
#[derive(Default)]
pub struct WsManager {
    peers: RwLock<HashMap<String, Peer>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `conn_id` and return the receiving end of its outbox.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let peer = Peer {
            outbox,
            connected_at: chrono::Utc::now(),
        };
        if self.peers.write().await.insert(conn_id.clone(), peer).is_some() {
            tracing::warn!(conn_id = %conn_id, "Replaced an existing socket with the same id");
        }
        inbox
    }

    pub async fn remove(&self, conn_id: &str) {
        self.peers.write().await.remove(conn_id);
    }

    /// Queue `message` for one socket. `false` if it is unknown or closed.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.peers
            .read()
            .await
            .get(conn_id)
            .is_some_and(|peer| peer.outbox.send(message).is_ok())
    }

    /// Queue `message` for every socket and return how many accepted it.
    pub async fn broadcast(&self, message: Message) -> usize {
        let mut peers = self.peers.write().await;
        let before = peers.len();
        peers.retain(|_, peer| peer.outbox.send(message.clone()).is_ok());
        let pruned = before - peers.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped closed sockets during broadcast");
        }
        peers.len()
    }

    pub async fn connected_at(&self, conn_id: &str) -> Option<Timestamp> {
        self.peers.read().await.get(conn_id).map(|peer| peer.connected_at)
    }

    pub async fn connection_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Ping every socket. Returns how many are still open.
    pub async fn ping_all(&self) -> usize {
        self.broadcast(Message::Ping(Bytes::new())).await
    }

    /// Queue a Close frame for every socket and forget them all.
    pub async fn shutdown_all(&self) {
        let peers: Vec<Peer> = self.peers.write().await.drain().map(|(_, p)| p).collect();
        for peer in &peers {
            let _ = peer.outbox.send(Message::Close(None));
        }
        tracing::info!(count = peers.len(), "Closed all task sockets");
    }
}
