//! Command dispatch.
//!
//! Every command produces exactly one [`CommandOutput`]. Commands that
//! never contact the provider (`dry-run`, `prompt-only`, preset listing)
//! do not require an API key.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use clipgen_core::cost::{check_resolution, CostQuote};
use clipgen_core::error::CoreError;
use clipgen_core::output::{
    CommandOutput, Completed, DryRunReport, PresetDetailReport, PresetListReport,
    PromptOnlyReport, PromptParameters,
};
use clipgen_core::params::Resolution;
use clipgen_core::preset::{resolve, PresetCatalog};
use clipgen_core::request::{parse_speed, GenerationRequest};
use clipgen_pipeline::{Controller, PipelineError};
use clipgen_provider::api::GeminiApi;
use clipgen_provider::download::Downloader;

use crate::cli::{Command, GenerationArgs};
use crate::config::AppConfig;

/// Run one parsed command to completion.
pub async fn run(command: Command, config: &AppConfig, cancel: CancellationToken) -> CommandOutput {
    match dispatch(command, config, cancel).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "Command failed");
            e.to_output()
        }
    }
}

async fn dispatch(
    command: Command,
    config: &AppConfig,
    cancel: CancellationToken,
) -> Result<CommandOutput, PipelineError> {
    match command {
        Command::Generate { generation, job } => {
            let request = generation.to_request(config)?;
            require_prompt(&request)?;
            let options = job.to_options(config)?;
            let catalog = load_catalog(config).await?;
            let controller = controller(config, cancel)?;
            let report = controller.generate(&request, &catalog, &options).await?;
            Ok(Completed::Generation(report).into())
        }

        Command::Extend {
            source,
            prompt,
            speed,
            preset,
            job,
        } => {
            let request = GenerationRequest {
                prompt,
                speed: speed.as_deref().map(parse_speed).transpose()?,
                preset,
                ..Default::default()
            };
            require_prompt(&request)?;
            request.validate()?;
            let options = job.to_options(config)?;
            let source = config.expand_path(&source);
            let catalog = load_catalog(config).await?;
            let controller = controller(config, cancel)?;
            let report = controller
                .extend(&source, &request, &catalog, &options)
                .await?;
            Ok(Completed::Extension(report).into())
        }

        Command::Status { operation_id } => {
            controller(config, cancel)?.status(&operation_id).await
        }

        Command::Cancel { operation_id } => {
            controller(config, cancel)?.cancel(&operation_id).await
        }

        Command::DryRun { generation, extend } => {
            let catalog = load_catalog(config).await?;
            Ok(dry_run(&generation, extend.is_some(), config, &catalog)?)
        }

        Command::PromptOnly { generation } => {
            let catalog = load_catalog(config).await?;
            Ok(prompt_only(&generation, config, &catalog)?)
        }

        Command::ListPresets => {
            let catalog = load_catalog(config).await?;
            Ok(Completed::Presets(PresetListReport {
                presets: catalog.summaries(),
            })
            .into())
        }

        Command::ShowPreset { name } => {
            let catalog = load_catalog(config).await?;
            let preset = catalog.require(&name)?.clone();
            Ok(Completed::Preset(PresetDetailReport { name, preset }).into())
        }
    }
}

// ---------------------------------------------------------------------------
// Offline commands
// ---------------------------------------------------------------------------

/// Quote a generation or, when `is_extension`, a 7-second 720p extension.
///
/// The request is resolved against the catalog first, so a preset's
/// resolution is checked exactly as `generate` would check it.
pub fn dry_run(
    args: &GenerationArgs,
    is_extension: bool,
    config: &AppConfig,
    catalog: &PresetCatalog,
) -> Result<CommandOutput, CoreError> {
    let request = args.to_request(config)?;
    let resolved = resolve(&request, catalog)?;

    if is_extension {
        let quote = CostQuote::for_extension(resolved.speed);
        return Ok(CommandOutput::DryRun(DryRunReport::from_quote(
            quote,
            Resolution::P720,
            true,
        )));
    }

    let duration = resolved.duration.ok_or_else(|| {
        CoreError::validation(
            "MISSING_DURATION",
            "dry-run requires --duration or --extend",
        )
    })?;
    check_resolution(resolved.resolution, duration)?;

    let quote = CostQuote::new(duration.seconds(), resolved.speed);
    Ok(CommandOutput::DryRun(DryRunReport::from_quote(
        quote,
        resolved.resolution,
        false,
    )))
}

/// Resolve presets and report the final prompt and parameters.
pub fn prompt_only(
    args: &GenerationArgs,
    config: &AppConfig,
    catalog: &PresetCatalog,
) -> Result<CommandOutput, CoreError> {
    let request = args.to_request(config)?;
    let resolved = resolve(&request, catalog)?;
    let prompt = resolved.require_prompt()?.to_string();

    let reference_images =
        (!resolved.reference_images.is_empty()).then(|| resolved.reference_images.clone());

    Ok(Completed::PromptOnly(PromptOnlyReport {
        mode: "prompt-only",
        prompt,
        negative_prompt: resolved.negative_prompt,
        preset: resolved.preset,
        reference_images,
        parameters: PromptParameters {
            duration: resolved.duration,
            aspect_ratio: resolved.aspect_ratio,
            resolution: resolved.resolution,
            fps: resolved.fps,
            speed: resolved.speed,
        },
    })
    .into())
}

// ---- helpers ----

fn require_prompt(request: &GenerationRequest) -> Result<(), CoreError> {
    match request.prompt.as_deref() {
        Some(p) if !p.trim().is_empty() => Ok(()),
        _ => Err(CoreError::validation(
            "MISSING_PROMPT",
            "Missing required: --prompt",
        )),
    }
}

async fn load_catalog(config: &AppConfig) -> Result<PresetCatalog, CoreError> {
    PresetCatalog::load(config.presets_path.as_deref()).await
}

fn controller(config: &AppConfig, cancel: CancellationToken) -> Result<Controller, CoreError> {
    let provider_config = config.provider_config()?;
    tracing::debug!(config = ?provider_config, "Provider configured");
    Ok(Controller::new(
        Arc::new(GeminiApi::new(provider_config.clone())),
        Arc::new(Downloader::new(&provider_config)),
    )
    .with_cancellation(cancel))
}
