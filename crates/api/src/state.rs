use std::sync::Arc;

use userdir_core::dataset::UserDirectory;

use crate::config::ServerConfig;
use crate::engine::TaskQueue;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Read-only member directory the listing endpoint queries.
    pub directory: Arc<UserDirectory>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Submission handle for the simulated task worker.
    pub task_queue: TaskQueue,
}
