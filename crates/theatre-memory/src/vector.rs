// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding-similarity long-term memory.
//!
//! Each line is embedded on insert. A query embeds the probe, ranks every
//! entry by cosine similarity, keeps the `top_k` best and asks the
//! completion service to digest them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use theatre_core::TheatreError;
use theatre_core::traits::EmbeddingAdapter;
use theatre_core::types::EmbeddingInput;

use crate::long_term::{Digester, LongTermMemory, pack_leading};
use crate::types::{MemoryEntry, ScoredEntry, cosine_similarity};

/// Default number of entries fed into a digest.
pub const DEFAULT_TOP_K: usize = 2;

pub struct VectorMemoryIndex {
    entries: RwLock<Vec<MemoryEntry>>,
    embedder: Arc<dyn EmbeddingAdapter>,
    digester: Digester,
    top_k: usize,
}

impl VectorMemoryIndex {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, digester: Digester) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            embedder,
            digester,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Sets how many entries feed each digest. Zero is treated as one.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, TheatreError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| TheatreError::embedding("embedding service returned no vectors"))
    }

    /// Entries ranked against `probe`, best first, at most `top_k`.
    ///
    /// Ties keep insertion order.
    pub async fn retrieve(&self, probe: &str) -> Result<Vec<ScoredEntry>, TheatreError> {
        if self.entries.read().await.is_empty() {
            return Ok(Vec::new());
        }
        let probe_embedding = self.embed_one(probe).await?;

        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredEntry> = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| ScoredEntry {
                position,
                text: entry.text.clone(),
                score: cosine_similarity(&probe_embedding, &entry.embedding),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);
        Ok(scored)
    }
}

#[async_trait]
impl LongTermMemory for VectorMemoryIndex {
    async fn insert(&self, text: &str) -> Result<(), TheatreError> {
        let embedding = self.embed_one(text).await?;
        self.entries.write().await.push(MemoryEntry {
            text: text.to_string(),
            embedding,
        });
        Ok(())
    }

    async fn query(&self, probe: &str) -> Result<String, TheatreError> {
        let ranked = self.retrieve(probe).await?;
        if ranked.is_empty() {
            return Ok(String::new());
        }
        debug!(
            candidates = ranked.len(),
            best_score = ranked[0].score,
            "vector memory retrieved"
        );

        let texts: Vec<&str> = ranked.iter().map(|e| e.text.as_str()).collect();
        let context = pack_leading(&texts, self.digester.context_budget(probe));
        self.digester.digest(&context, probe).await
    }

    async fn entries(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.text.clone())
            .collect()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl std::fmt::Debug for VectorMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorMemoryIndex")
            .field("top_k", &self.top_k)
            .field("digester", &self.digester)
            .finish_non_exhaustive()
    }
}
