//! Reconnection with exponential backoff for the task socket.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::socket::{open_socket, WsStream};

/// Backoff policy: wait `initial_delay`, then multiply by `multiplier` after
/// every failed attempt, never exceeding `max_delay`.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            multiplier: 2.0,
        }
    }
}

/// Delay sequence produced by a [`ReconnectConfig`].
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    next: Duration,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            next: config.initial_delay.min(config.max_delay),
            config,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    /// Never ends; the delay plateaus at `max_delay`.
    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current
            .mul_f64(self.config.multiplier.max(1.0))
            .min(self.config.max_delay);
        Some(current)
    }
}

/// Reopen the socket at `url`, sleeping out the backoff before each attempt.
///
/// `None` means `cancel` fired first.
pub async fn reconnect_loop(
    url: &str,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<WsStream> {
    for (attempt, delay) in (1u32..).zip(Backoff::new(config.clone())) {
        tracing::debug!(url, attempt, delay_ms = delay.as_millis() as u64, "Waiting to reconnect");

        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = async {
                tokio::time::sleep(delay).await;
                open_socket(url).await
            } => Some(result),
        };

        match result {
            None => {
                tracing::info!(url, attempt, "Reconnect cancelled");
                return None;
            }
            Some(Ok(stream)) => {
                tracing::info!(url, attempt, "Task socket reconnected");
                return Some(stream);
            }
            Some(Err(e)) => tracing::warn!(url, attempt, error = %e, "Reconnect attempt failed"),
        }
    }
    None
}
