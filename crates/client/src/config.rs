use std::str::FromStr;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend HTTP base URL, without a trailing slash.
    pub api_url: String,
    /// Task socket URL.
    pub ws_url: String,
    /// Per-request timeout for HTTP calls and dispatch acknowledgements.
    pub request_timeout: Duration,
}

/// A configuration variable was present but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} has an invalid value: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".into(),
            ws_url: "ws://localhost:3001/api/ws".into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                       |
    /// |--------------------------------|-------------------------------|
    /// | `USERDIR_API_URL`              | `http://localhost:3001`       |
    /// | `USERDIR_WS_URL`               | `ws://localhost:3001/api/ws`  |
    /// | `USERDIR_REQUEST_TIMEOUT_SECS` | `10`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let api_url = std::env::var("USERDIR_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let ws_url = std::env::var("USERDIR_WS_URL").unwrap_or(defaults.ws_url);
        let timeout_secs: u64 = env_parse("USERDIR_REQUEST_TIMEOUT_SECS", 10)?;

        Ok(Self {
            api_url,
            ws_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Config pointing at a backend on `addr`, e.g. `127.0.0.1:3001`.
    pub fn for_addr(addr: impl std::fmt::Display) -> Self {
        Self {
            api_url: format!("http://{addr}"),
            ws_url: format!("ws://{addr}/api/ws"),
            ..Self::default()
        }
    }
}

fn env_parse<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        Err(_) => Ok(default),
    }
}
