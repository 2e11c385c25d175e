//! The provider abstraction the lifecycle controller is written against.
//!
//! A provider accepts one submission per call and hands back an opaque
//! [`OperationHandle`]; the caller then polls that handle until the job
//! reports done. [`crate::api::GeminiApi`] is the HTTP implementation;
//! tests drive the controller with in-memory fakes.

use async_trait::async_trait;
use clipgen_core::params::{AspectRatio, ClipDuration, Resolution};

use crate::reference::ReferenceImage;

/// Opaque identifier of one in-flight remote job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationHandle {
    pub id: String,
}

impl OperationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl std::fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Finished artifact: where to fetch it and the token that identifies it
/// for a later extension.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoResult {
    pub uri: String,
    pub reference_token: serde_json::Value,
}

/// One status observation of a remote job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollStatus {
    pub done: bool,
    pub result: Option<VideoResult>,
    /// Provider-reported failure message, if the job failed.
    pub error: Option<String>,
}

impl PollStatus {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn succeeded(result: VideoResult) -> Self {
        Self {
            done: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            done: true,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Parameters of a first-time generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub duration: ClipDuration,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub negative_prompt: Option<String>,
    pub seed: Option<i64>,
    pub fps: u32,
    pub reference_images: Vec<ReferenceImage>,
}

/// What to ask the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderRequest {
    /// A fresh clip from a prompt.
    Generate {
        model: &'static str,
        prompt: String,
        params: GenerationParams,
    },
    /// A continuation of a previously produced clip.
    Extend {
        model: &'static str,
        prompt: String,
        /// The prior clip's reference token, passed through verbatim.
        video: serde_json::Value,
    },
}

impl ProviderRequest {
    pub fn model(&self) -> &'static str {
        match self {
            Self::Generate { model, .. } | Self::Extend { model, .. } => model,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Self::Generate { prompt, .. } | Self::Extend { prompt, .. } => prompt,
        }
    }
}

/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered with a body we could not interpret.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error(
        "Operation cancellation is not supported by this provider. Use the provider console to cancel operations."
    )]
    CancelNotSupported,
}

/// An asynchronous media-generation backend.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submit one job. Rejections are reported synchronously and never retried.
    async fn submit(&self, request: &ProviderRequest) -> Result<OperationHandle, ProviderError>;

    /// Query the current status of a job.
    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus, ProviderError>;

    /// Ask the provider to stop a job. Unsupported unless overridden.
    async fn cancel(&self, handle: &OperationHandle) -> Result<(), ProviderError> {
        tracing::debug!(operation_id = %handle, "Cancellation requested but not supported");
        Err(ProviderError::CancelNotSupported)
    }
}
