//! The lifecycle controller shared by every remote command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use clipgen_core::metadata::{self, OperationMetadata};
use clipgen_core::request::DEFAULT_TIMEOUT_MS;
use clipgen_provider::download::ArtifactFetcher;
use clipgen_provider::operation::Operation;
use clipgen_provider::poller::{poll_until_done, PollConfig, PollError};
use clipgen_provider::provider::{VideoProvider, VideoResult};

use crate::error::PipelineError;

/// Per-invocation options for a generation or extension.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Where the finished clip is written. Its sidecar goes beside it.
    pub output: PathBuf,
    /// Client-side poll budget.
    pub timeout: Duration,
    /// Whether the caller confirmed spend on the higher-cost tier.
    pub confirm_cost: bool,
}

impl JobOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            confirm_cost: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn confirmed(mut self, confirm_cost: bool) -> Self {
        self.confirm_cost = confirm_cost;
        self
    }
}

/// Drives one job from submission to a persisted, extendable clip.
///
/// Collaborators are injected at construction; nothing is read from the
/// process environment.
pub struct Controller {
    pub(crate) provider: Arc<dyn VideoProvider>,
    pub(crate) fetcher: Arc<dyn ArtifactFetcher>,
    poll_config: PollConfig,
    cancel: CancellationToken,
}

impl Controller {
    pub fn new(provider: Arc<dyn VideoProvider>, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self {
            provider,
            fetcher,
            poll_config: PollConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// Token that, once cancelled, stops waiting on the current job.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll until the job finishes, returning its id and result reference.
    pub(crate) async fn await_result(
        &self,
        operation: Operation,
        timeout: Duration,
    ) -> Result<(String, VideoResult), PipelineError> {
        let operation = poll_until_done(
            self.provider.as_ref(),
            operation,
            timeout,
            &self.poll_config,
            &self.cancel,
        )
        .await?;
        let operation_id = operation.id().to_string();
        let result = operation.into_result().ok_or_else(|| PollError::NoResult {
            operation_id: operation_id.clone(),
        })?;
        Ok((operation_id, result))
    }

    /// Download the clip then record its sidecar. Returns the sidecar path.
    pub(crate) async fn materialize(
        &self,
        result: &VideoResult,
        output: &Path,
        record: &OperationMetadata,
    ) -> Result<PathBuf, PipelineError> {
        self.fetcher
            .fetch(&result.uri, output)
            .await
            .map_err(|source| PipelineError::Download {
                operation_id: record.operation_id.clone(),
                source,
            })?;

        metadata::save(output, record)
            .await
            .map_err(|source| PipelineError::Persist {
                operation_id: record.operation_id.clone(),
                source,
            })
    }
}
