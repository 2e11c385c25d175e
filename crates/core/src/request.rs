//! Caller-facing generation request and input validation helpers.
//!
//! Every field the caller may omit is an `Option`: `Some` means the caller
//! set it explicitly, which is what the preset merge keys on. Parsing
//! helpers turn raw strings into typed values with a field-specific error
//! code so that input errors are caught before any network call.

use std::path::PathBuf;

use crate::error::CoreError;
use crate::params::{AspectRatio, ClipDuration, Resolution, Speed};

// ---------------------------------------------------------------------------
// Limits and defaults
// ---------------------------------------------------------------------------

/// Maximum prompt length in characters.
pub const MAX_PROMPT_CHARS: usize = 4096;

/// Maximum number of reference images per request.
pub const MAX_REFERENCE_IMAGES: usize = 3;

/// Frame rate used when neither caller nor preset sets one.
pub const DEFAULT_FPS: u32 = 24;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

/// Default client-side poll budget in milliseconds (5 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;
/// Smallest poll budget accepted from a caller.
pub const MIN_TIMEOUT_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A possibly partial request to generate a clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: Option<String>,
    pub duration: Option<ClipDuration>,
    pub aspect_ratio: Option<AspectRatio>,
    pub speed: Option<Speed>,
    pub resolution: Option<Resolution>,
    pub negative_prompt: Option<String>,
    pub fps: Option<u32>,
    pub seed: Option<i64>,
    pub reference_images: Vec<PathBuf>,
    pub preset: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: ClipDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Check the fields that can be validated without a preset.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(ref prompt) = self.prompt {
            validate_prompt(prompt)?;
        }
        if let Some(fps) = self.fps {
            validate_fps(fps)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a prompt: non-empty after trimming and within the length limit.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::validation(
            "MISSING_PROMPT",
            "Prompt must not be empty",
        ));
    }
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(CoreError::validation(
            "PROMPT_TOO_LONG",
            format!("Prompt too long: {len} chars (max {MAX_PROMPT_CHARS})"),
        ));
    }
    Ok(())
}

/// Validate a frame rate is within `[MIN_FPS, MAX_FPS]`.
pub fn validate_fps(fps: u32) -> Result<(), CoreError> {
    if !(MIN_FPS..=MAX_FPS).contains(&fps) {
        return Err(CoreError::validation(
            "INVALID_FPS",
            format!("Invalid fps: {fps}. Must be between {MIN_FPS} and {MAX_FPS}"),
        ));
    }
    Ok(())
}

/// Validate a poll timeout in milliseconds.
pub fn validate_timeout_ms(timeout_ms: u64) -> Result<(), CoreError> {
    if timeout_ms < MIN_TIMEOUT_MS {
        return Err(CoreError::validation(
            "INVALID_TIMEOUT",
            format!("Invalid timeout: {timeout_ms}ms. Must be at least {MIN_TIMEOUT_MS}ms"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_duration(raw: &str) -> Result<ClipDuration, CoreError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(ClipDuration::from_seconds)
        .ok_or_else(|| {
            CoreError::validation(
                "INVALID_DURATION",
                format!("Invalid duration: {raw}. Must be 4, 6, or 8"),
            )
        })
}

pub fn parse_aspect_ratio(raw: &str) -> Result<AspectRatio, CoreError> {
    AspectRatio::from_str(raw).ok_or_else(|| {
        CoreError::validation(
            "INVALID_ASPECT_RATIO",
            format!(
                "Invalid aspect-ratio: {raw}. Must be one of: {}",
                AspectRatio::ALL.join(", ")
            ),
        )
    })
}

pub fn parse_resolution(raw: &str) -> Result<Resolution, CoreError> {
    Resolution::from_str(raw).ok_or_else(|| {
        CoreError::validation(
            "INVALID_RESOLUTION",
            format!(
                "Invalid resolution: {raw}. Must be one of: {}",
                Resolution::ALL.join(", ")
            ),
        )
    })
}

pub fn parse_speed(raw: &str) -> Result<Speed, CoreError> {
    Speed::from_str(raw).ok_or_else(|| {
        CoreError::validation(
            "INVALID_SPEED",
            format!("Invalid speed: {raw}. Must be one of: {}", Speed::ALL.join(", ")),
        )
    })
}
