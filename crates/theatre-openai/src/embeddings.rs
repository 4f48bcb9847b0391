// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote embedding adapter for the `/embeddings` endpoint.

use async_trait::async_trait;

use theatre_core::error::TheatreError;
use theatre_core::traits::{EmbeddingAdapter, PluginAdapter};
use theatre_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

use crate::client::OpenAiClient;
use crate::types::EmbeddingRequest;

/// Embeds text through an OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, TheatreError> {
        match self.client.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, TheatreError> {
        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let mut response = self.client.embed(&request).await?;

        if response.data.len() != expected {
            return Err(TheatreError::embedding(format!(
                "expected {expected} vectors, got {}",
                response.data.len()
            )));
        }
        // Servers may return vectors out of order; `index` is authoritative.
        response.data.sort_by_key(|d| d.index);
        let dimensions = response.data.first().map_or(0, |d| d.embedding.len());
        let embeddings = response.data.into_iter().map(|d| d.embedding).collect();

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
