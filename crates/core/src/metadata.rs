//! Sidecar metadata written next to every produced clip.
//!
//! The sidecar for `clip.mp4` is `clip.meta.json`. Its presence is what
//! marks a clip as produced by this tool and therefore extendable: the
//! record carries the provider's opaque reference token, the cumulative
//! duration so far and the framing needed to compose an extension.
//!
//! Sidecars are overwritten on save and never deleted. There is no
//! cross-process locking; concurrent writers race and the last one wins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::params::{AspectRatio, Resolution};
use crate::types::Timestamp;

/// Extension replacing the clip's own extension to form the sidecar name.
pub const SIDECAR_EXTENSION: &str = "meta.json";

/// Persisted record describing one produced clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// Provider operation that produced the clip.
    pub operation_id: String,
    /// Opaque provider reference to the clip, stored verbatim.
    pub video_reference: serde_json::Value,
    /// Cumulative duration in seconds, including all prior extensions.
    pub duration: u32,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub created_at: Timestamp,
}

impl OperationMetadata {
    pub fn new(
        operation_id: impl Into<String>,
        video_reference: serde_json::Value,
        duration: u32,
        aspect_ratio: AspectRatio,
        resolution: Resolution,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            video_reference,
            duration,
            aspect_ratio,
            resolution,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Derive the sidecar path for a clip: same directory and stem, `.meta.json`.
pub fn sidecar_path(clip_path: &Path) -> PathBuf {
    clip_path.with_extension(SIDECAR_EXTENSION)
}

/// Serialize `metadata` beside `clip_path`, replacing any existing sidecar.
///
/// Returns the sidecar path.
pub async fn save(clip_path: &Path, metadata: &OperationMetadata) -> Result<PathBuf, CoreError> {
    let path = sidecar_path(clip_path);
    let body = serde_json::to_vec_pretty(metadata).map_err(|e| CoreError::MetadataWrite {
        path: path.clone(),
        source: e.into(),
    })?;

    tokio::fs::write(&path, body)
        .await
        .map_err(|source| CoreError::MetadataWrite {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(
        path = %path.display(),
        operation_id = %metadata.operation_id,
        duration = metadata.duration,
        "Saved clip metadata",
    );
    Ok(path)
}

/// Read the sidecar for `clip_path`.
///
/// A missing, unreadable or malformed sidecar all fail with
/// [`CoreError::MetadataMissing`].
pub async fn load(clip_path: &Path) -> Result<OperationMetadata, CoreError> {
    let path = sidecar_path(clip_path);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Sidecar unreadable");
            return Err(CoreError::MetadataMissing { path });
        }
    };
    serde_json::from_str(&text).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Sidecar malformed");
        CoreError::MetadataMissing { path }
    })
}
