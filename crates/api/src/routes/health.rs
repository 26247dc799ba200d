use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Open task sockets.
    pub connections: usize,
}

/// `GET /health`, mounted at the root rather than under `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/health",
        get(|State(state): State<AppState>| async move {
            Json(HealthResponse {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
                connections: state.ws_manager.connection_count().await,
            })
        }),
    )
}
