use clipgen_core::error::CoreError;
use clipgen_core::output::{CancelledReport, CommandOutput, ErrorReport};
use clipgen_provider::download::DownloadError;
use clipgen_provider::poller::PollError;
use clipgen_provider::provider::ProviderError;
use clipgen_provider::reference::ReferenceImageError;

/// Errors from a lifecycle command.
///
/// Variants raised after a submission carry the operation id so the caller
/// can report the remote job that is still running or already finished.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Validation, policy or metadata errors raised before submission.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    ReferenceImage(#[from] ReferenceImageError),

    /// The provider rejected the submission. Never retried.
    #[error("Failed to submit video generation: {0}")]
    SubmissionFailed(#[source] ProviderError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("{source}")]
    Download {
        operation_id: String,
        #[source]
        source: DownloadError,
    },

    /// The clip was downloaded but its sidecar could not be written.
    #[error("{source}")]
    Persist {
        operation_id: String,
        #[source]
        source: CoreError,
    },

    #[error("Failed to check operation status: {0}")]
    StatusFailed(#[source] ProviderError),

    #[error("{0}")]
    CancelFailed(#[source] ProviderError),
}

impl PipelineError {
    /// Stable error code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::ReferenceImage(e) => e.code(),
            Self::SubmissionFailed(_) => "SUBMISSION_FAILED",
            Self::Poll(e) => e.code(),
            Self::Download { source, .. } => source.code(),
            Self::Persist { source, .. } => source.code(),
            Self::StatusFailed(_) => "OPERATION_STATUS_FAILED",
            Self::CancelFailed(ProviderError::CancelNotSupported) => "CANCEL_NOT_SUPPORTED",
            Self::CancelFailed(_) => "PROVIDER_ERROR",
        }
    }

    /// The remote job affected, if one was submitted.
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Self::Poll(e) => Some(e.operation_id()),
            Self::Download { operation_id, .. } | Self::Persist { operation_id, .. } => {
                Some(operation_id)
            }
            _ => None,
        }
    }

    /// Render as the command's result document.
    ///
    /// An interrupted poll is reported as `cancelled`; everything else is
    /// an `error`.
    pub fn to_output(&self) -> CommandOutput {
        if let Self::Poll(PollError::Interrupted { operation_id, .. }) = self {
            return CommandOutput::Cancelled(CancelledReport {
                operation_id: operation_id.clone(),
                message: self.to_string(),
                interrupted: true,
            });
        }
        CommandOutput::Error(ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
            operation_id: self.operation_id().map(str::to_string),
        })
    }
}
