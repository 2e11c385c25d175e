//! Wait-then-query loop over a submitted operation.
//!
//! The interval starts at [`PollConfig::initial_delay`], grows by
//! [`PollConfig::multiplier`] after each query and is clamped to
//! [`PollConfig::max_delay`]. The elapsed time is checked against the
//! timeout before every wait. A timeout only stops local tracking; the
//! remote job keeps running.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::operation::Operation;
use crate::provider::{ProviderError, VideoProvider};

/// Tunable parameters for the polling backoff.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait before the first status query.
    pub initial_delay: Duration,
    /// Upper bound on the wait between queries.
    pub max_delay: Duration,
    /// Factor by which the wait grows after each query.
    pub multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            multiplier: 1.5,
        }
    }
}

/// Calculate the next wait from the current one.
///
/// The result is clamped to [`PollConfig::max_delay`].
pub fn next_delay(current: Duration, config: &PollConfig) -> Duration {
    Duration::from_secs_f64(current.as_secs_f64() * config.multiplier).min(config.max_delay)
}

/// Errors ending a poll loop. Every variant carries the operation id so the
/// caller can report the still-running remote job.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Operation timed out after {}s. The job may still be running; operation ID: {operation_id}", .elapsed.as_secs())]
    Timeout {
        operation_id: String,
        elapsed: Duration,
    },

    #[error("Video generation failed: {message}")]
    Provider {
        operation_id: String,
        message: String,
    },

    #[error("No video returned from the provider")]
    NoResult { operation_id: String },

    #[error("Failed to check operation status: {source}")]
    Status {
        operation_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("Stopped waiting after {}s; the remote job was not cancelled", .elapsed.as_secs())]
    Interrupted {
        operation_id: String,
        elapsed: Duration,
    },
}

impl PollError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "TIMEOUT",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::NoResult { .. } => "NO_VIDEO_RETURNED",
            Self::Status { .. } => "OPERATION_STATUS_FAILED",
            Self::Interrupted { .. } => "INTERRUPTED",
        }
    }

    pub fn operation_id(&self) -> &str {
        match self {
            Self::Timeout { operation_id, .. }
            | Self::Provider { operation_id, .. }
            | Self::NoResult { operation_id }
            | Self::Status { operation_id, .. }
            | Self::Interrupted { operation_id, .. } => operation_id,
        }
    }
}

/// Poll `operation` until the provider reports it done, `timeout` elapses
/// or `cancel` fires.
///
/// Returns the operation in the `Succeeded` state.
pub async fn poll_until_done(
    provider: &dyn VideoProvider,
    mut operation: Operation,
    timeout: Duration,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Operation, PollError> {
    let started = Instant::now();
    let mut delay = config.initial_delay;
    let operation_id = operation.id().to_string();

    loop {
        let elapsed = started.elapsed();
        if elapsed > timeout {
            operation.time_out(elapsed);
            tracing::warn!(
                operation_id = %operation_id,
                elapsed_secs = elapsed.as_secs(),
                attempts = operation.attempts(),
                "Poll timeout exceeded",
            );
            return Err(PollError::Timeout {
                operation_id,
                elapsed,
            });
        }

        // Wait before the next query, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(operation_id = %operation_id, "Polling interrupted");
                return Err(PollError::Interrupted {
                    operation_id,
                    elapsed: started.elapsed(),
                });
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let status = provider
            .poll(operation.handle())
            .await
            .map_err(|source| PollError::Status {
                operation_id: operation_id.clone(),
                source,
            })?;
        operation.record_poll();

        tracing::info!(
            operation_id = %operation_id,
            attempt = operation.attempts(),
            done = status.done,
            elapsed_secs = started.elapsed().as_secs(),
            "Polled operation",
        );

        if status.done {
            if let Some(message) = status.error {
                operation.fail(message.clone());
                return Err(PollError::Provider {
                    operation_id,
                    message,
                });
            }
            return match status.result {
                Some(result) => {
                    operation.succeed(result);
                    Ok(operation)
                }
                None => {
                    operation.fail("no video returned");
                    Err(PollError::NoResult { operation_id })
                }
            };
        }

        delay = next_delay(delay, config);
    }
}
