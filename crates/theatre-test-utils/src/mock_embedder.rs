// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapters for exercising error and cancellation paths.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use theatre_core::TheatreError;
use theatre_core::traits::{EmbeddingAdapter, PluginAdapter};
use theatre_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use theatre_memory::HashEmbedder;

/// Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, TheatreError> {
        Ok(HealthStatus::Unhealthy("always fails".into()))
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, TheatreError> {
        Err(TheatreError::embedding("embedding service unavailable"))
    }
}

/// Hash embedder that cancels a token the `nth` time it is asked to embed
/// text containing `trigger`, then yields before answering.
///
/// Each agent embeds every recorded line into its own index, so `nth = 2`
/// fires while the second agent is recording a line the first already has.
#[derive(Debug)]
pub struct CancellingEmbedder {
    inner: HashEmbedder,
    trigger: String,
    nth: usize,
    seen: AtomicUsize,
    cancel: CancellationToken,
}

impl CancellingEmbedder {
    pub fn new(dim: usize, trigger: &str, nth: usize, cancel: CancellationToken) -> Self {
        Self {
            inner: HashEmbedder::new(dim),
            trigger: trigger.to_string(),
            nth,
            seen: AtomicUsize::new(0),
            cancel,
        }
    }
}

#[async_trait]
impl PluginAdapter for CancellingEmbedder {
    fn name(&self) -> &str {
        "cancelling-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, TheatreError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for CancellingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, TheatreError> {
        if input.texts.iter().any(|t| t.contains(&self.trigger))
            && self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.nth
        {
            self.cancel.cancel();
            tokio::task::yield_now().await;
        }
        self.inner.embed(input).await
    }
}
