//! REST client for the Gemini long-running video endpoints.
//!
//! Wraps submission (`POST models/{model}:predictLongRunning`) and
//! operation retrieval (`GET {operation}`) using [`reqwest`].

use async_trait::async_trait;

use crate::client::ProviderConfig;
use crate::messages::{self, SubmitResponse};
use crate::provider::{OperationHandle, PollStatus, ProviderError, ProviderRequest, VideoProvider};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini video API.
pub struct GeminiApi {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiApi {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Fetch the raw operation resource for `name`.
    pub async fn get_operation(
        &self,
        name: &str,
    ) -> Result<messages::OperationResponse, ProviderError> {
        let response = self
            .client
            .get(format!("{}/{}", self.config.base_url, name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        messages::parse_operation(&body)
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, otherwise a
    /// [`ProviderError::Api`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl VideoProvider for GeminiApi {
    async fn submit(&self, request: &ProviderRequest) -> Result<OperationHandle, ProviderError> {
        let model = request.model();
        let body = messages::predict_body(request);

        tracing::info!(
            model,
            prompt_chars = request.prompt().chars().count(),
            key = %self.config.key_hint(),
            "Submitting video generation",
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:predictLongRunning",
                self.config.base_url, model
            ))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        tracing::info!(operation_id = %submitted.name, "Operation submitted");
        Ok(OperationHandle::new(submitted.name))
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus, ProviderError> {
        Ok(self.get_operation(&handle.id).await?.into_status())
    }
}
