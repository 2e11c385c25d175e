//! Preset catalog and the configuration resolver.
//!
//! A preset is a named bundle of defaults loaded read-only from a JSON
//! file. [`resolve`] merges a preset into a caller's [`GenerationRequest`]
//! with caller values always taking precedence, producing a
//! [`ResolvedConfiguration`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::{AspectRatio, ClipDuration, Resolution, Speed};
use crate::request::{validate_prompt, GenerationRequest, DEFAULT_FPS};

/// Catalog shipped with the binary, used when no presets file is configured.
const BUNDLED_PRESETS: &str = include_str!("../presets.json");

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// Named bundle of default overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_suffix: Option<String>,
}

impl Preset {
    pub fn has_prompt_modifiers(&self) -> bool {
        self.prompt_prefix.is_some() || self.prompt_suffix.is_some()
    }
}

/// One row of the `list-presets` report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSummary {
    pub name: String,
    pub aspect_ratio: Option<AspectRatio>,
    pub resolution: Option<Resolution>,
    pub fps: Option<u32>,
    pub has_prompt_modifiers: bool,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only set of presets keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    /// Parse a catalog from its JSON text (an object keyed by preset name).
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let presets: BTreeMap<String, Preset> =
            serde_json::from_str(text).map_err(|e| CoreError::PresetsInvalid(e.to_string()))?;
        Ok(Self { presets })
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json(BUNDLED_PRESETS)
    }

    /// Load a catalog from `path`, or the bundled one when `path` is `None`.
    ///
    /// A configured file that does not exist yields an empty catalog.
    pub async fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let Some(path) = path else {
            return Self::bundled();
        };
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let catalog = Self::from_json(&text)?;
                tracing::debug!(path = %path.display(), count = catalog.len(), "Loaded presets");
                Ok(catalog)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Presets file not found, using empty catalog");
                Ok(Self::default())
            }
            Err(e) => Err(CoreError::PresetsInvalid(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Look up a preset, failing with `UNKNOWN_PRESET` when absent.
    pub fn require(&self, name: &str) -> Result<&Preset, CoreError> {
        self.get(name)
            .ok_or_else(|| CoreError::UnknownPreset(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Summaries of every preset, sorted by name.
    pub fn summaries(&self) -> Vec<PresetSummary> {
        self.presets
            .iter()
            .map(|(name, preset)| PresetSummary {
                name: name.clone(),
                aspect_ratio: preset.aspect_ratio,
                resolution: preset.resolution,
                fps: preset.fps,
                has_prompt_modifiers: preset.has_prompt_modifiers(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// A [`GenerationRequest`] after preset merge, with built-in defaults filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfiguration {
    pub prompt: Option<String>,
    pub duration: Option<ClipDuration>,
    pub aspect_ratio: Option<AspectRatio>,
    pub speed: Speed,
    pub resolution: Resolution,
    pub negative_prompt: Option<String>,
    pub fps: u32,
    pub seed: Option<i64>,
    pub reference_images: Vec<PathBuf>,
    pub preset: Option<String>,
}

impl ResolvedConfiguration {
    /// The final prompt, validated.
    pub fn require_prompt(&self) -> Result<&str, CoreError> {
        let prompt = self.prompt.as_deref().ok_or_else(|| {
            CoreError::validation("MISSING_PROMPT", "Missing required: --prompt")
        })?;
        validate_prompt(prompt)?;
        Ok(prompt)
    }

    pub fn require_duration(&self) -> Result<ClipDuration, CoreError> {
        self.duration.ok_or_else(|| {
            CoreError::validation("MISSING_DURATION", "Missing required: --duration")
        })
    }

    pub fn require_aspect_ratio(&self) -> Result<AspectRatio, CoreError> {
        self.aspect_ratio.ok_or_else(|| {
            CoreError::validation("MISSING_ASPECT_RATIO", "Missing required: --aspect-ratio")
        })
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Merge the request's named preset (if any) into the request.
///
/// Precedence per field is caller, then preset, then built-in default.
/// Prompt prefix/suffix wrap the caller's prompt; negative prompts are
/// joined with the caller's first. The result depends only on the inputs.
pub fn resolve(
    request: &GenerationRequest,
    catalog: &PresetCatalog,
) -> Result<ResolvedConfiguration, CoreError> {
    let preset = match request.preset.as_deref() {
        Some(name) => Some(catalog.require(name)?),
        None => None,
    };
    Ok(merge(request, preset))
}

fn merge(request: &GenerationRequest, preset: Option<&Preset>) -> ResolvedConfiguration {
    let empty = Preset::default();
    let preset_ref = preset.unwrap_or(&empty);

    let prompt = request.prompt.as_ref().map(|prompt| {
        format!(
            "{}{prompt}{}",
            preset_ref.prompt_prefix.as_deref().unwrap_or(""),
            preset_ref.prompt_suffix.as_deref().unwrap_or(""),
        )
    });

    let negative_prompt = match (
        request.negative_prompt.as_deref(),
        preset_ref.negative_prompt.as_deref(),
    ) {
        (Some(caller), Some(from_preset)) => Some(format!("{caller}, {from_preset}")),
        (Some(caller), None) => Some(caller.to_string()),
        (None, Some(from_preset)) => Some(from_preset.to_string()),
        (None, None) => None,
    };

    ResolvedConfiguration {
        prompt,
        duration: request.duration,
        aspect_ratio: request.aspect_ratio.or(preset_ref.aspect_ratio),
        speed: request.speed.unwrap_or_default(),
        resolution: request
            .resolution
            .or(preset_ref.resolution)
            .unwrap_or_default(),
        negative_prompt,
        fps: request.fps.or(preset_ref.fps).unwrap_or(DEFAULT_FPS),
        seed: request.seed,
        reference_images: request.reference_images.clone(),
        preset: request.preset.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
