// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds one fresh long-term store per agent from configuration.

use std::sync::Arc;

use theatre_config::model::{IndexKind, MemoryConfig};
use theatre_core::traits::{EmbeddingAdapter, ProviderAdapter};
use theatre_core::types::CompletionOptions;

use crate::list::ListMemoryIndex;
use crate::long_term::{Digester, LongTermMemory};
use crate::vector::VectorMemoryIndex;

/// Shared handles plus settings; every `build` returns an empty, independent store.
#[derive(Clone)]
pub struct LongTermFactory {
    kind: IndexKind,
    top_k: usize,
    embedder: Arc<dyn EmbeddingAdapter>,
    digester: Digester,
}

impl LongTermFactory {
    pub fn new(
        config: &MemoryConfig,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            kind: config.index,
            top_k: config.similarity_top_k,
            embedder,
            digester: Digester::new(provider, options),
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn build(&self) -> Box<dyn LongTermMemory> {
        match self.kind {
            IndexKind::Vector => Box::new(
                VectorMemoryIndex::new(self.embedder.clone(), self.digester.clone())
                    .with_top_k(self.top_k),
            ),
            IndexKind::List => Box::new(ListMemoryIndex::new(self.digester.clone())),
        }
    }
}
