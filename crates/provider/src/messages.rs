//! Wire types for the Gemini long-running video endpoints.
//!
//! Submission posts `{"instances": [...], "parameters": {...}}` to
//! `models/{model}:predictLongRunning` and receives an operation name.
//! Polling fetches the operation, whose `response` carries the generated
//! samples once `done` is true.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use clipgen_core::request::DEFAULT_FPS;

use crate::provider::{PollStatus, ProviderError, ProviderRequest, VideoResult};

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Build the JSON body for a `predictLongRunning` call.
///
/// `resolution` is only sent for the elevated tier and `fps` only when it
/// differs from the provider default.
pub fn predict_body(request: &ProviderRequest) -> Value {
    match request {
        ProviderRequest::Generate { prompt, params, .. } => {
            let mut instance = json!({ "prompt": prompt });
            if !params.reference_images.is_empty() {
                let images: Vec<Value> = params
                    .reference_images
                    .iter()
                    .map(|img| {
                        json!({
                            "image": {
                                "bytesBase64Encoded": img.data_base64,
                                "mimeType": img.mime_type,
                            },
                            "referenceType": "asset",
                        })
                    })
                    .collect();
                instance["referenceImages"] = Value::Array(images);
            }

            let mut parameters = json!({
                "aspectRatio": params.aspect_ratio.as_str(),
                "durationSeconds": params.duration.seconds(),
                "sampleCount": 1,
            });
            if params.resolution.is_elevated() {
                parameters["resolution"] = json!(params.resolution.as_str());
            }
            if let Some(ref negative) = params.negative_prompt {
                parameters["negativePrompt"] = json!(negative);
            }
            if let Some(seed) = params.seed {
                parameters["seed"] = json!(seed);
            }
            if params.fps != DEFAULT_FPS {
                parameters["fps"] = json!(params.fps);
            }

            json!({ "instances": [instance], "parameters": parameters })
        }
        ProviderRequest::Extend { prompt, video, .. } => json!({
            "instances": [{ "prompt": prompt, "video": video }],
            "parameters": { "sampleCount": 1 },
        }),
    }
}

/// Response to a successful submission.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Operation name, e.g. `models/veo-3.1-generate-preview/operations/abc`.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// A long-running operation as returned by `GET /{name}`.
#[derive(Debug, Deserialize, Serialize)]
pub struct OperationResponse {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// Failure details on a finished operation.
#[derive(Debug, Deserialize, Serialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl OperationResponse {
    /// Reduce the operation to the provider-neutral [`PollStatus`].
    pub fn into_status(self) -> PollStatus {
        if !self.done {
            return PollStatus::pending();
        }
        if let Some(err) = self.error {
            let message = match err.code {
                Some(code) => format!("{} (code {code})", err.message),
                None => err.message,
            };
            return PollStatus::failed(message);
        }
        PollStatus {
            done: true,
            result: self.response.as_ref().and_then(first_video),
            error: None,
        }
    }
}

/// Extract the first generated video from an operation response.
///
/// Accepts both the REST shape (`generateVideoResponse.generatedSamples`)
/// and the SDK shape (`generatedVideos`). The whole `video` object is the
/// reference token.
fn first_video(response: &Value) -> Option<VideoResult> {
    let samples = response
        .pointer("/generateVideoResponse/generatedSamples")
        .or_else(|| response.get("generatedVideos"))?
        .as_array()?;
    let video = samples.first()?.get("video")?;
    let uri = video.get("uri")?.as_str()?.to_string();
    Some(VideoResult {
        uri,
        reference_token: video.clone(),
    })
}

/// Parse an operation body, mapping decode failures to [`ProviderError::Malformed`].
pub fn parse_operation(body: &str) -> Result<OperationResponse, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}
