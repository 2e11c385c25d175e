use std::path::PathBuf;

use crate::cost::GateViolation;

/// Domain errors raised before any provider call is made.
///
/// Every variant maps to a stable machine-readable code via
/// [`CoreError::code`]; the display text is the human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A malformed or missing input field.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("Unknown preset: {0}. Use list-presets to see available presets.")]
    UnknownPreset(String),

    #[error("Preset catalog is invalid: {0}")]
    PresetsInvalid(String),

    /// A cost or safety policy check failed.
    #[error(transparent)]
    Gate(#[from] GateViolation),

    #[error(
        "Cannot extend: {} not found. Only videos generated by this tool can be extended.",
        .path.display()
    )]
    MetadataMissing { path: PathBuf },

    #[error("Cannot extend: {}: {reason}", .path.display())]
    MetadataInvalid { path: PathBuf, reason: String },

    #[error("Failed to write metadata to {}: {source}", .path.display())]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`].
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Stable error code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } => code,
            Self::UnknownPreset(_) => "UNKNOWN_PRESET",
            Self::PresetsInvalid(_) => "PRESETS_INVALID",
            Self::Gate(v) => v.code(),
            Self::MetadataMissing { .. } => "EXTENSION_METADATA_MISSING",
            Self::MetadataInvalid { .. } => "EXTENSION_METADATA_INVALID",
            Self::MetadataWrite { .. } => "METADATA_WRITE_FAILED",
        }
    }
}
