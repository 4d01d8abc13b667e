//! Backoff schedule for re-establishing the executor event stream.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{EventStreamClient, EventStreamConnection};

#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for the wait between retries.
    pub max_delay: Duration,
    /// Growth factor applied after every failed retry.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Endless sequence of waits: `initial_delay`, grown by `multiplier`,
    /// capped at `max_delay`.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            upcoming: self.initial_delay.min(self.max_delay),
            max_delay: self.max_delay,
            multiplier: self.multiplier.max(1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Backoff {
    upcoming: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.upcoming;
        self.upcoming = current.mul_f64(self.multiplier).min(self.max_delay);
        Some(current)
    }
}

/// Retry `client.connect()` on the backoff schedule.
///
/// Sleeps before every attempt, including the first. `None` means
/// `cancel` fired before a connection was made.
pub async fn reconnect_loop(
    client: &EventStreamClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<EventStreamConnection> {
    for (attempt, delay) in (1u32..).zip(config.backoff()) {
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        tracing::debug!(url = %client.events_url(), attempt, "Retrying event stream");
        let result = tokio::select! {
            _ = cancel.cancelled() => return None,
            result = client.connect() => result,
        };

        match result {
            Ok(conn) => {
                tracing::info!(url = %conn.url, attempt, "Event stream re-established");
                return Some(conn);
            }
            Err(e) => {
                tracing::warn!(
                    url = %client.events_url(),
                    attempt,
                    error = %e,
                    "Event stream retry failed",
                );
            }
        }
    }
    None
}
