use userdir_core::error::CoreError;

/// Errors surfaced by the directory client and its adapters.
///
/// Cloneable so the controller can keep the last failure in its snapshot
/// while also returning it to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (network, DNS, closed socket).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error` field of the JSON body, or the raw body.
        message: String,
    },

    /// The task socket refused to queue a dispatch.
    #[error("Task {task_id} rejected: {message}")]
    Rejected {
        /// Task the server refused.
        task_id: userdir_core::types::TaskId,
        /// `message` field of the error frame.
        message: String,
    },

    /// A response body or socket frame could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Filter criteria were rejected before any request was made.
    #[error("Invalid criteria: {0}")]
    Validation(String),
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ClientError::Validation(msg),
            other => ClientError::Decode(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
