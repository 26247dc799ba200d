use axum::routing::post;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/tasks/{id}/dispatch", post(tasks::dispatch_task))
}
