// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for Theatre.
//!
//! Implements [`ProviderAdapter`] against the text-completion endpoint served
//! by llama.cpp, Ollama, vLLM and OpenAI, plus an [`EmbeddingAdapter`] for the
//! matching embeddings endpoint.

pub mod client;
pub mod embeddings;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use theatre_config::model::ProviderConfig;
use theatre_core::error::TheatreError;
use theatre_core::traits::{PluginAdapter, ProviderAdapter};
use theatre_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};

use crate::client::OpenAiClient;
use crate::types::CompletionRequest;

pub use embeddings::OpenAiEmbedder;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Text-completion provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> no auth.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
}

impl OpenAiProvider {
    /// Creates a provider from the `[provider]` config section.
    pub fn new(config: &ProviderConfig) -> Result<Self, TheatreError> {
        let api_key = resolve_api_key(config.api_key.as_deref());
        let client = OpenAiClient::new(
            &config.base_url,
            api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(
            base_url = %config.base_url,
            model = %config.model,
            authenticated = api_key.is_some(),
            "completion provider initialized"
        );
        Ok(Self::with_client(client, config.model.clone()))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The underlying HTTP client, for sharing with [`OpenAiEmbedder`].
    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }

    fn to_completion_request(&self, request: ProviderRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: if request.stop.is_empty() {
                None
            } else {
                Some(request.stop)
            },
        }
    }
}

/// Picks the configured key, then the environment, then nothing.
fn resolve_api_key(configured: Option<&str>) -> Option<String> {
    configured
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TheatreError> {
        match self.client.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TheatreError> {
        let body = self.to_completion_request(request);
        let response = self.client.complete(&body).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TheatreError::completion("response contained no choices"))?;
        debug!(
            chars = choice.text.len(),
            finish_reason = ?choice.finish_reason,
            "completion received"
        );

        Ok(ProviderResponse {
            text: choice.text,
            model: response.model.unwrap_or_else(|| self.model.clone()),
            stop_reason: choice.finish_reason,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}
