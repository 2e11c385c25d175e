//! Extension Controller: continue a clip this tool produced earlier.

use std::path::Path;

use clipgen_core::cost::{check_extension, is_extendable, EXTENSION_SECS};
use clipgen_core::error::CoreError;
use clipgen_core::metadata::{self, OperationMetadata};
use clipgen_core::output::ExtensionReport;
use clipgen_core::params::Resolution;
use clipgen_core::preset::{resolve, PresetCatalog};
use clipgen_core::request::GenerationRequest;

use crate::controller::{Controller, JobOptions};
use crate::error::PipelineError;
use crate::submit::{extension_request, submit};

impl Controller {
    /// Append [`EXTENSION_SECS`] to the clip at `source`.
    ///
    /// The prior sidecar is loaded before anything else that could cost
    /// money; a clip without one fails with no network call. The new clip
    /// keeps the prior aspect ratio and is always recorded at 720p. Its
    /// `extendable` flag is reported, never enforced.
    pub async fn extend(
        &self,
        source: &Path,
        request: &GenerationRequest,
        catalog: &PresetCatalog,
        options: &JobOptions,
    ) -> Result<ExtensionReport, PipelineError> {
        request.validate()?;
        let config = resolve(request, catalog)?;
        let prompt = config.require_prompt()?.to_string();

        let prior = metadata::load(source).await?;
        let total_duration = prior.duration.checked_add(EXTENSION_SECS).ok_or_else(|| {
            CoreError::MetadataInvalid {
                path: metadata::sidecar_path(source),
                reason: format!("recorded duration {} is out of range", prior.duration),
            }
        })?;
        let quote = check_extension(config.speed, options.confirm_cost)?;

        tracing::info!(
            source = %source.display(),
            prior_operation = %prior.operation_id,
            prior_duration = prior.duration,
            speed = %config.speed,
            cost = %quote,
            "Starting extension",
        );

        let operation = submit(
            self.provider.as_ref(),
            &extension_request(&prior, prompt, config.speed),
        )
        .await?;
        let (operation_id, result) = self.await_result(operation, options.timeout).await?;

        let record = OperationMetadata::new(
            operation_id.clone(),
            result.reference_token.clone(),
            total_duration,
            prior.aspect_ratio,
            Resolution::P720,
        );
        let metadata_path = self.materialize(&result, &options.output, &record).await?;

        Ok(ExtensionReport {
            output_path: options.output.clone(),
            metadata_path,
            operation_id,
            extended_from: source.to_path_buf(),
            extension_duration: EXTENSION_SECS,
            total_duration,
            resolution: Resolution::P720,
            cost: quote,
            model: quote.model(),
            extendable: is_extendable(total_duration),
        })
    }
}
