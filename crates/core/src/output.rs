//! Structured command results.
//!
//! Every command prints exactly one [`CommandOutput`] document. The
//! `status` field is the discriminant; each variant's payload has a fixed
//! shape. Field names are camelCase, matching the sidecar format.

use std::path::PathBuf;

use serde::Serialize;

use crate::cost::CostQuote;
use crate::params::{AspectRatio, ClipDuration, Resolution, Speed};
use crate::preset::{Preset, PresetSummary};

/// One command result, tagged by `status`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CommandOutput {
    Complete(Completed),
    DryRun(DryRunReport),
    InProgress(InProgressReport),
    Cancelled(CancelledReport),
    Error(ErrorReport),
}

impl CommandOutput {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorReport {
            code: code.into(),
            message: message.into(),
            operation_id: None,
        })
    }

    /// Whether the invoking process should exit with a failure status.
    ///
    /// A `cancelled` result fails only when local tracking was interrupted;
    /// an accepted remote cancellation exits successfully.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Error(_) => true,
            Self::Cancelled(report) => report.interrupted,
            _ => false,
        }
    }
}

/// Payloads of a `complete` result, one per command.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Completed {
    Generation(GenerationReport),
    Extension(ExtensionReport),
    Presets(PresetListReport),
    Preset(PresetDetailReport),
    PromptOnly(PromptOnlyReport),
    Operation(OperationStatusReport),
}

impl From<Completed> for CommandOutput {
    fn from(c: Completed) -> Self {
        Self::Complete(c)
    }
}

// ---------------------------------------------------------------------------
// complete
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
    pub operation_id: String,
    pub duration: u32,
    pub resolution: Resolution,
    pub cost: CostQuote,
    pub model: &'static str,
    pub extendable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionReport {
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
    pub operation_id: String,
    pub extended_from: PathBuf,
    pub extension_duration: u32,
    pub total_duration: u32,
    pub resolution: Resolution,
    pub cost: CostQuote,
    pub model: &'static str,
    pub extendable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetListReport {
    pub presets: Vec<PresetSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetDetailReport {
    pub name: String,
    pub preset: Preset,
}

/// The fully resolved prompt and parameters, without submitting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOnlyReport {
    pub mode: &'static str,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub preset: Option<String>,
    pub reference_images: Option<Vec<PathBuf>>,
    pub parameters: PromptParameters,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptParameters {
    pub duration: Option<ClipDuration>,
    pub aspect_ratio: Option<AspectRatio>,
    pub resolution: Resolution,
    pub fps: u32,
    pub speed: Speed,
}

/// A finished remote job, as reported by `status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatusReport {
    pub operation_id: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// dry-run / in-progress / cancelled / error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    pub estimated_cost: CostQuote,
    pub duration: u32,
    pub resolution: Resolution,
    pub model: &'static str,
    pub speed: Speed,
    pub is_extension: bool,
}

impl DryRunReport {
    pub fn from_quote(quote: CostQuote, resolution: Resolution, is_extension: bool) -> Self {
        Self {
            estimated_cost: quote,
            duration: quote.seconds,
            resolution,
            model: quote.model(),
            speed: quote.speed,
            is_extension,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgressReport {
    pub operation_id: String,
    pub done: bool,
}

/// Local tracking of a job was abandoned; the remote job is not stopped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledReport {
    pub operation_id: String,
    pub message: String,
    /// The wait was abandoned locally; the remote job may still be running.
    #[serde(skip)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    /// Set when a remote job was submitted but its outcome is unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}
