//! Reference images attached to a generation request.
//!
//! Images are read from disk and sent inline as base64 with a MIME type
//! derived from the file extension.

use std::path::{Path, PathBuf};

use base64::Engine;

/// Supported image extensions and their MIME types.
const MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
];

/// An image payload ready to embed in a provider request.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub mime_type: &'static str,
    pub data_base64: String,
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data_base64.len())
            .finish()
    }
}

/// Errors loading a reference image.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceImageError {
    #[error("Unsupported image format: {} ({}). Use PNG, JPG, or WebP.", .path.display(), .extension)]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to read reference image {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReferenceImageError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_IMAGE_FORMAT",
            Self::Unreadable { .. } => "REFERENCE_IMAGE_UNREADABLE",
        }
    }
}

/// MIME type for an image path, by extension (case-insensitive).
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
}

/// Load and encode every image in `paths`, in order.
///
/// The format of every path is checked before any file is read.
pub async fn load_reference_images(
    paths: &[PathBuf],
) -> Result<Vec<ReferenceImage>, ReferenceImageError> {
    let mime_types = paths
        .iter()
        .map(|path| {
            mime_type_for(path).ok_or_else(|| ReferenceImageError::UnsupportedFormat {
                path: path.clone(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut images = Vec::with_capacity(paths.len());
    for (path, mime_type) in paths.iter().zip(mime_types) {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ReferenceImageError::Unreadable {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), mime_type, "Loaded reference image");
        images.push(ReferenceImage {
            mime_type,
            data_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
        });
    }
    Ok(images)
}
