//! Local view of one in-flight remote job.
//!
//! ```text
//! Submitted -> Polling -> { Succeeded, Failed, TimedOut }
//! ```
//!
//! Terminal states are final. A transition requested on a terminal
//! operation is ignored and logged; the same handle is never retried.

use std::time::Duration;

use crate::provider::{OperationHandle, VideoResult};

#[derive(Debug, Clone, PartialEq)]
pub enum OperationState {
    Submitted,
    Polling { attempts: u32 },
    Succeeded(VideoResult),
    Failed(String),
    TimedOut(Duration),
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Polling { .. } => "polling",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::TimedOut(_) => "timed_out",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::TimedOut(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    handle: OperationHandle,
    state: OperationState,
}

impl Operation {
    /// Wrap a freshly returned provider handle.
    pub fn submitted(handle: OperationHandle) -> Self {
        Self {
            handle,
            state: OperationState::Submitted,
        }
    }

    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    pub fn id(&self) -> &str {
        &self.handle.id
    }

    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Number of status queries made so far.
    pub fn attempts(&self) -> u32 {
        match self.state {
            OperationState::Polling { attempts } => attempts,
            _ => 0,
        }
    }

    /// The result reference, once succeeded.
    pub fn result(&self) -> Option<&VideoResult> {
        match &self.state {
            OperationState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<VideoResult> {
        match self.state {
            OperationState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Count one status query.
    pub fn record_poll(&mut self) {
        let attempts = self.attempts() + 1;
        self.transition(OperationState::Polling { attempts });
    }

    pub fn succeed(&mut self, result: VideoResult) {
        self.transition(OperationState::Succeeded(result));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.transition(OperationState::Failed(message.into()));
    }

    pub fn time_out(&mut self, elapsed: Duration) {
        self.transition(OperationState::TimedOut(elapsed));
    }

    fn transition(&mut self, next: OperationState) {
        if self.state.is_terminal() {
            tracing::warn!(
                operation_id = %self.handle,
                from = self.state.as_str(),
                to = next.as_str(),
                "Ignoring transition out of terminal state",
            );
            return;
        }
        tracing::debug!(
            operation_id = %self.handle,
            from = self.state.as_str(),
            to = next.as_str(),
            "Operation state change",
        );
        self.state = next;
    }
}
