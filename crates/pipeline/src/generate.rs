//! First-time generation.

use clipgen_core::cost::{check_generation, is_extendable};
use clipgen_core::metadata::OperationMetadata;
use clipgen_core::output::GenerationReport;
use clipgen_core::preset::{resolve, PresetCatalog};
use clipgen_core::request::GenerationRequest;
use clipgen_provider::reference::load_reference_images;

use crate::controller::{Controller, JobOptions};
use crate::error::PipelineError;
use crate::submit::{generation_request, submit};

impl Controller {
    /// Resolve, gate, submit, poll, download and record a new clip.
    ///
    /// Every check that can fail without the network runs before the single
    /// submission; a gate failure therefore never reaches the provider.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        catalog: &PresetCatalog,
        options: &JobOptions,
    ) -> Result<GenerationReport, PipelineError> {
        request.validate()?;
        let config = resolve(request, catalog)?;
        config.require_prompt()?;
        let duration = config.require_duration()?;
        let aspect_ratio = config.require_aspect_ratio()?;

        let quote = check_generation(&config, options.confirm_cost)?;
        let images = load_reference_images(&config.reference_images).await?;

        tracing::info!(
            duration = duration.seconds(),
            aspect_ratio = %aspect_ratio,
            resolution = %config.resolution,
            speed = %config.speed,
            preset = config.preset.as_deref().unwrap_or("-"),
            cost = %quote,
            "Starting generation",
        );

        let operation = submit(self.provider.as_ref(), &generation_request(&config, images)?).await?;
        let (operation_id, result) = self.await_result(operation, options.timeout).await?;

        let record = OperationMetadata::new(
            operation_id.clone(),
            result.reference_token.clone(),
            duration.seconds(),
            aspect_ratio,
            config.resolution,
        );
        let metadata_path = self.materialize(&result, &options.output, &record).await?;

        Ok(GenerationReport {
            output_path: options.output.clone(),
            metadata_path,
            operation_id,
            duration: duration.seconds(),
            resolution: config.resolution,
            cost: quote,
            model: quote.model(),
            extendable: is_extendable(duration.seconds()),
        })
    }
}
