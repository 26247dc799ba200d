use std::str::FromStr;

use userdir_core::dataset::DEFAULT_DATASET_SIZE;
use userdir_core::stream::{DEFAULT_CHUNK_INTERVAL_MS, DEFAULT_CHUNK_SIZE};
use userdir_core::tasks::DEFAULT_TASK_DELAY_MS;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of generated directory members (default: `500`).
    pub dataset_size: usize,
    /// Seed for the generated directory (default: `42`).
    pub dataset_seed: u64,
    /// Simulated task processing time in milliseconds (default: `2000`).
    pub task_delay_ms: u64,
    /// Characters per chunk on `/api/stream` (default: `64`).
    pub stream_chunk_size: usize,
    /// Pause between stream chunks in milliseconds (default: `30`).
    pub stream_interval_ms: u64,
}

/// A configuration variable was present but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} has an invalid value: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATASET_SIZE`         | `500`                      |
    /// | `DATASET_SEED`         | `42`                       |
    /// | `TASK_DELAY_MS`        | `2000`                     |
    /// | `STREAM_CHUNK_SIZE`    | `64`                       |
    /// | `STREAM_INTERVAL_MS`   | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port: env_parse("PORT", 3001)?,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30)?,
            dataset_size: env_parse("DATASET_SIZE", DEFAULT_DATASET_SIZE)?,
            dataset_seed: env_parse("DATASET_SEED", 42)?,
            task_delay_ms: env_parse("TASK_DELAY_MS", DEFAULT_TASK_DELAY_MS)?,
            stream_chunk_size: env_parse("STREAM_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            stream_interval_ms: env_parse("STREAM_INTERVAL_MS", DEFAULT_CHUNK_INTERVAL_MS)?,
        })
    }
}

/// Read `var` and parse it, falling back to `default` when unset.
fn env_parse<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        Err(_) => Ok(default),
    }
}
