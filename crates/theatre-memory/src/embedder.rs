// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local feature-hashing embedding adapter.
//!
//! Produces deterministic bag-of-words vectors on CPU with zero external API
//! calls. Each lowercased token is hashed with SHA-256 into one of `dim`
//! buckets with a hash-derived sign, then the vector is L2-normalized, so
//! cosine similarity tracks shared vocabulary.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use theatre_core::error::TheatreError;
use theatre_core::traits::EmbeddingAdapter;
use theatre_core::traits::adapter::PluginAdapter;
use theatre_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

use crate::types::l2_normalize;

/// Default vector size, matching common sentence-embedding models.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Deterministic hashing embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    /// Creates an embedder producing `dim`-sized vectors. Zero is treated as one.
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    /// Embed a single text string.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let (bucket, sign) = hash_token(&token, self.dim);
            vec[bucket] += sign;
        }
        l2_normalize(&vec)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

/// Lowercased alphanumeric runs.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Bucket index and sign for a token.
fn hash_token(token: &str, dim: usize) -> (usize, f32) {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let h = u64::from_le_bytes(bytes);
    let bucket = (h % dim as u64) as usize;
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

#[async_trait]
impl PluginAdapter for HashEmbedder {
    fn name(&self) -> &str {
        "hash-embedder"
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
impl EmbeddingAdapter for HashEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, TheatreError> {
        let embeddings = input.texts.iter().map(|t| self.embed_text(t)).collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dim,
        })
    }
}
