// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the completion and embedding adapters named by the configuration.

use std::sync::Arc;

use tracing::info;

use theatre_agent::SessionFactory;
use theatre_config::TheatreConfig;
use theatre_config::model::EmbedderKind;
use theatre_core::TheatreError;
use theatre_core::traits::{EmbeddingAdapter, PluginAdapter};
use theatre_memory::HashEmbedder;
use theatre_openai::{OpenAiEmbedder, OpenAiProvider};

/// The adapters shared by every session in this process.
pub struct Adapters {
    pub provider: Arc<OpenAiProvider>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
}

impl Adapters {
    pub fn from_config(config: &TheatreConfig) -> Result<Self, TheatreError> {
        let provider = Arc::new(OpenAiProvider::new(&config.provider)?);
        let embedder: Arc<dyn EmbeddingAdapter> = match config.memory.embedder {
            EmbedderKind::Hash => Arc::new(HashEmbedder::new(config.memory.embedding_dim)),
            EmbedderKind::Remote => Arc::new(OpenAiEmbedder::new(
                provider.client().clone(),
                config.memory.embedding_model.clone(),
            )),
        };
        info!(
            index = ?config.memory.index,
            embedder = embedder.name(),
            "memory adapters initialized"
        );
        Ok(Self { provider, embedder })
    }

    pub fn session_factory(&self, config: &TheatreConfig) -> SessionFactory {
        SessionFactory::from_config(config, self.provider.clone(), self.embedder.clone())
    }
}
