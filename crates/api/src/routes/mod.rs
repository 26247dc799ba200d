pub mod health;
pub mod tasks;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                      task socket (WebSocket)
/// /users                   paginated, filtered member listing
/// /users/{id}              single member
/// /facets                  filter options
/// /stream                  chunked plain-text demo
/// /tasks/{id}/dispatch     REST task dispatch (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/stream", get(handlers::stream::stream_text))
        .merge(users::router())
        .merge(tasks::router())
}
