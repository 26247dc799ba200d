//! REST task dispatch.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use userdir_core::tasks::DispatchAck;
use userdir_core::types::TaskId;

use crate::engine::TaskJob;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/tasks/{id}/dispatch
///
/// Queues the task and answers 202 immediately. The completion has no
/// originating socket, so it is broadcast to every task socket.
pub async fn dispatch_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> AppResult<(StatusCode, Json<DataResponse<DispatchAck>>)> {
    if task_id == 0 {
        return Err(AppError::BadRequest("task id must be positive".into()));
    }

    state.task_queue.submit(TaskJob {
        task_id,
        origin: None,
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: DispatchAck::pending(task_id),
        }),
    ))
}
