//! One-shot queries against an existing remote job.

use clipgen_core::output::{
    CancelledReport, CommandOutput, Completed, InProgressReport, OperationStatusReport,
};
use clipgen_provider::provider::OperationHandle;

use crate::controller::Controller;
use crate::error::PipelineError;

impl Controller {
    /// Query a job once: `complete` when done, `in-progress` otherwise.
    pub async fn status(&self, operation_id: &str) -> Result<CommandOutput, PipelineError> {
        let handle = OperationHandle::new(operation_id);
        let status = self
            .provider
            .poll(&handle)
            .await
            .map_err(PipelineError::StatusFailed)?;

        tracing::info!(operation_id, done = status.done, "Checked operation status");

        if !status.done {
            return Ok(CommandOutput::InProgress(InProgressReport {
                operation_id: operation_id.to_string(),
                done: false,
            }));
        }
        Ok(Completed::Operation(OperationStatusReport {
            operation_id: operation_id.to_string(),
            done: true,
            video_uri: status.result.map(|r| r.uri),
            error: status.error,
        })
        .into())
    }

    /// Ask the provider to stop a job.
    pub async fn cancel(&self, operation_id: &str) -> Result<CommandOutput, PipelineError> {
        let handle = OperationHandle::new(operation_id);
        self.provider
            .cancel(&handle)
            .await
            .map_err(PipelineError::CancelFailed)?;

        Ok(CommandOutput::Cancelled(CancelledReport {
            operation_id: operation_id.to_string(),
            message: "Cancellation requested".to_string(),
            interrupted: false,
        }))
    }
}
