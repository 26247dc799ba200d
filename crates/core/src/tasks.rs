//! Task dispatch wire protocol and task board types.
//!
//! Messages travel over the task WebSocket as JSON with a `"type"` tag:
//!
//! ```text
//! client -> server  {"type":"dispatch_task","taskId":3}
//! server -> client  {"type":"task_accepted","taskId":3,"status":"pending"}
//! server -> client  {"type":"task_result","taskId":3,"result":"...","timestamp":1700000000000}
//! server -> client  {"type":"error","taskId":0,"message":"task id must be positive"}
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{TaskId, Timestamp};

/// Number of tasks on the dispatch board.
pub const BOARD_SIZE: TaskId = 20;

/// Simulated processing time before a task completes, in milliseconds.
pub const DEFAULT_TASK_DELAY_MS: u64 = 2000;

/// Result texts a simulated worker picks from.
pub const RESULT_TEXTS: &[&str] = &[
    "Analysis Complete",
    "Optimization Done",
    "Data Synchronized",
    "Pattern Recognized",
    "Validation Successful",
    "Metric Computed",
];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of a single board task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Idle,
    Pending,
    Completed,
}

/// Immediate acknowledgement of a dispatch; carries no completion data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchAck {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

impl DispatchAck {
    pub fn pending(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
        }
    }
}

/// Asynchronous completion of a dispatched task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletion {
    pub task_id: TaskId,
    pub result: String,
    /// Completion time, milliseconds since the Unix epoch on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: Timestamp,
}

impl TaskCompletion {
    /// A completion stamped with the current time.
    pub fn now(task_id: TaskId, result: impl Into<String>) -> Self {
        Self {
            task_id,
            result: result.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire messages
// ---------------------------------------------------------------------------

/// Frames a client sends on the task socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    DispatchTask {
        #[serde(rename = "taskId")]
        task_id: TaskId,
    },
}

/// Frames the server sends on the task socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    TaskAccepted(DispatchAck),
    TaskResult(TaskCompletion),
    /// The server could not act on a client frame. `taskId` is set when a
    /// specific dispatch was rejected.
    Error {
        #[serde(rename = "taskId", default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        message: String,
    },
}

impl ServerMessage {
    /// Error frame not tied to any task.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            task_id: None,
            message: message.into(),
        }
    }

    /// Error frame rejecting the dispatch of `task_id`.
    pub fn rejected(task_id: TaskId, message: impl Into<String>) -> Self {
        Self::Error {
            task_id: Some(task_id),
            message: message.into(),
        }
    }
}

/// Parse a client frame. Unknown `type` values are errors.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// Parse a server frame. Unknown `type` values are errors; callers should
/// log and continue.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
