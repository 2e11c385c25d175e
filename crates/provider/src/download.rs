//! Fetches a finished clip to local disk.
//!
//! Bytes are written to a `.part` file beside the destination and renamed
//! into place once complete, so a clip at its final path is never partial.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::client::ProviderConfig;

/// Errors downloading a finished clip.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Invalid video URI {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Failed to download video: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to download video: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to write video to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn code(&self) -> &'static str {
        "DOWNLOAD_FAILED"
    }
}

/// Something that can materialize a finished artifact at a local path.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `uri` into `dest`, returning the number of bytes written.
    async fn fetch(&self, uri: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// Downloads artifacts, authenticating with the configured API key.
pub struct Downloader {
    client: reqwest::Client,
    api_key: String,
}

impl Downloader {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
        }
    }

    /// Fetch `uri` into `dest`, creating missing parent directories.
    ///
    /// Returns the number of bytes written.
    pub async fn download(&self, uri: &str, dest: &Path) -> Result<u64, DownloadError> {
        let mut url = reqwest::Url::parse(uri).map_err(|e| DownloadError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Video download rejected");
            return Err(DownloadError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let partial = partial_path(dest);
        if let Err(source) = tokio::fs::write(&partial, &bytes).await {
            discard_partial(&partial).await;
            return Err(DownloadError::Write {
                path: partial,
                source,
            });
        }
        if let Err(source) = tokio::fs::rename(&partial, dest).await {
            discard_partial(&partial).await;
            return Err(DownloadError::Write {
                path: dest.to_path_buf(),
                source,
            });
        }

        tracing::info!(path = %dest.display(), bytes = bytes.len(), "Video downloaded");
        Ok(bytes.len() as u64)
    }
}

#[async_trait]
impl ArtifactFetcher for Downloader {
    async fn fetch(&self, uri: &str, dest: &Path) -> Result<u64, DownloadError> {
        self.download(uri, dest).await
    }
}

/// Best-effort removal of a partially written file.
async fn discard_partial(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), error = %e, "Failed to remove partial download");
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
