//! Operation Submitter: builds one provider request and submits it once.

use clipgen_core::error::CoreError;
use clipgen_core::metadata::OperationMetadata;
use clipgen_core::params::Speed;
use clipgen_core::preset::ResolvedConfiguration;
use clipgen_provider::operation::Operation;
use clipgen_provider::provider::{GenerationParams, ProviderRequest, VideoProvider};
use clipgen_provider::reference::ReferenceImage;

use crate::error::PipelineError;

/// Build a first-generation request from a gated configuration.
pub fn generation_request(
    config: &ResolvedConfiguration,
    reference_images: Vec<ReferenceImage>,
) -> Result<ProviderRequest, CoreError> {
    Ok(ProviderRequest::Generate {
        model: config.speed.model(),
        prompt: config.require_prompt()?.to_string(),
        params: GenerationParams {
            duration: config.require_duration()?,
            aspect_ratio: config.require_aspect_ratio()?,
            resolution: config.resolution,
            negative_prompt: config.negative_prompt.clone(),
            seed: config.seed,
            fps: config.fps,
            reference_images,
        },
    })
}

/// Build an extension request continuing the clip described by `prior`.
pub fn extension_request(
    prior: &OperationMetadata,
    prompt: impl Into<String>,
    speed: Speed,
) -> ProviderRequest {
    ProviderRequest::Extend {
        model: speed.model(),
        prompt: prompt.into(),
        video: prior.video_reference.clone(),
    }
}

/// Perform exactly one submission. A rejection is returned as
/// [`PipelineError::SubmissionFailed`] and is not retried.
pub async fn submit(
    provider: &dyn VideoProvider,
    request: &ProviderRequest,
) -> Result<Operation, PipelineError> {
    match provider.submit(request).await {
        Ok(handle) => {
            tracing::info!(operation_id = %handle, model = request.model(), "Submission accepted");
            Ok(Operation::submitted(handle))
        }
        Err(e) => {
            tracing::error!(error = %e, model = request.model(), "Submission rejected");
            Err(PipelineError::SubmissionFailed(e))
        }
    }
}
