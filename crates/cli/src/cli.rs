//! Command-line surface.
//!
//! Enumerated values are accepted as raw strings and parsed by the domain
//! parsers so that a bad value fails with its own stable code rather than
//! a generic argument error.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use clipgen_core::error::CoreError;
use clipgen_core::output::CommandOutput;
use clipgen_core::request::{
    parse_aspect_ratio, parse_duration, parse_resolution, parse_speed, validate_fps,
    validate_timeout_ms, GenerationRequest, DEFAULT_TIMEOUT_MS,
};
use clipgen_pipeline::JobOptions;

use crate::config::AppConfig;

/// clipgen - generate and extend short video clips
#[derive(Debug, Parser)]
#[command(name = "clipgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new clip and wait for it to finish
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Append 7 seconds to a clip previously generated by this tool
    Extend {
        /// Path to the clip to extend (must have a .meta.json sidecar)
        source: String,

        /// Prompt describing how the clip continues
        #[arg(short, long)]
        prompt: Option<String>,

        /// Speed tier: fast or standard
        #[arg(long)]
        speed: Option<String>,

        /// Preset whose prompt modifiers are applied
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Query a remote operation once
    Status {
        /// Operation identifier
        operation_id: String,
    },

    /// Request cancellation of a remote operation
    Cancel {
        /// Operation identifier
        operation_id: String,
    },

    /// Estimate the cost of a generation or extension without submitting
    DryRun {
        #[command(flatten)]
        generation: GenerationArgs,

        /// Quote an extension of this clip instead of a generation
        #[arg(long, value_name = "PATH")]
        extend: Option<String>,
    },

    /// Print the fully resolved prompt and parameters without submitting
    PromptOnly {
        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// List the available presets
    ListPresets,

    /// Show one preset in full
    ShowPreset {
        /// Preset name
        name: String,
    },
}

/// Fields describing the clip to generate.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerationArgs {
    /// Text prompt describing the clip
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Clip duration in seconds (4, 6 or 8)
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Aspect ratio: 16:9, 9:16 or 1:1
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Speed tier: fast or standard
    #[arg(long)]
    pub speed: Option<String>,

    /// Resolution: 720p or 1080p (1080p requires 8s)
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// What the clip should avoid
    #[arg(long)]
    pub negative_prompt: Option<String>,

    /// Frame rate (1-60)
    #[arg(long)]
    pub fps: Option<String>,

    /// Seed for reproducible output
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Reference image (PNG, JPG or WebP); repeat up to 3 times
    #[arg(long = "reference-image", value_name = "PATH")]
    pub reference_images: Vec<String>,

    /// Preset supplying defaults for unset fields
    #[arg(long)]
    pub preset: Option<String>,
}

impl GenerationArgs {
    /// Parse into a domain request. Unset fields stay unset.
    pub fn to_request(&self, config: &AppConfig) -> Result<GenerationRequest, CoreError> {
        let fps = match self.fps.as_deref() {
            Some(raw) => {
                let fps = raw.trim().parse::<u32>().map_err(|_| {
                    CoreError::validation("INVALID_FPS", format!("Invalid fps: {raw}. Must be 1-60."))
                })?;
                validate_fps(fps)?;
                Some(fps)
            }
            None => None,
        };

        let request = GenerationRequest {
            prompt: self.prompt.clone(),
            duration: self.duration.as_deref().map(parse_duration).transpose()?,
            aspect_ratio: self
                .aspect_ratio
                .as_deref()
                .map(parse_aspect_ratio)
                .transpose()?,
            speed: self.speed.as_deref().map(parse_speed).transpose()?,
            resolution: self
                .resolution
                .as_deref()
                .map(parse_resolution)
                .transpose()?,
            negative_prompt: self.negative_prompt.clone(),
            fps,
            seed: self.seed,
            reference_images: self
                .reference_images
                .iter()
                .map(|p| config.expand_path(p))
                .collect(),
            preset: self.preset.clone(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Where and how long to wait for a submitted job.
#[derive(Debug, Clone, Default, Args)]
pub struct JobArgs {
    /// Output path for the finished clip
    #[arg(short, long)]
    pub output: Option<String>,

    /// Poll timeout in milliseconds (default 300000, minimum 1000)
    #[arg(long, value_name = "MS")]
    pub timeout: Option<String>,

    /// Confirm spend on the standard tier
    #[arg(long)]
    pub confirm_cost: bool,
}

impl JobArgs {
    pub fn to_options(&self, config: &AppConfig) -> Result<JobOptions, CoreError> {
        let output = self
            .output
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .map(|o| config.expand_path(o))
            .ok_or_else(|| CoreError::validation("MISSING_OUTPUT", "Missing required: --output"))?;

        let timeout_ms = match self.timeout.as_deref() {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| {
                    CoreError::validation(
                        "INVALID_TIMEOUT",
                        format!("Invalid timeout: {raw}. Must be a number of milliseconds."),
                    )
                })?;
                validate_timeout_ms(ms)?;
                ms
            }
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(JobOptions::new(output)
            .with_timeout(Duration::from_millis(timeout_ms))
            .confirmed(self.confirm_cost))
    }
}

/// Map a parse failure to the document to print, or `None` when clap is
/// displaying help or version text.
pub fn parse_failure(err: &clap::Error) -> Option<CommandOutput> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => {
            let message = err
                .to_string()
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Invalid arguments")
                .trim_start_matches("error: ")
                .to_string();
            Some(CommandOutput::error("INVALID_ARGUMENTS", message))
        }
    }
}

/// Expand a leading `~` against `home`.
pub fn expand_tilde(raw: &str, home: Option<&PathBuf>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.clone(),
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    }
}
