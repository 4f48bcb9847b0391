// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unranked long-term memory: every entry is a digest candidate.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use theatre_core::TheatreError;

use crate::long_term::{Digester, LongTermMemory, pack_newest};

/// Keeps lines in a plain list and digests as many as fit, newest first.
///
/// Needs no embedding service.
#[derive(Debug)]
pub struct ListMemoryIndex {
    entries: RwLock<Vec<String>>,
    digester: Digester,
}

impl ListMemoryIndex {
    pub fn new(digester: Digester) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            digester,
        }
    }
}

#[async_trait]
impl LongTermMemory for ListMemoryIndex {
    async fn insert(&self, text: &str) -> Result<(), TheatreError> {
        self.entries.write().await.push(text.to_string());
        Ok(())
    }

    async fn query(&self, probe: &str) -> Result<String, TheatreError> {
        let context: Vec<String> = {
            let entries = self.entries.read().await;
            if entries.is_empty() {
                return Ok(String::new());
            }
            pack_newest(&entries, self.digester.context_budget(probe))
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        debug!(packed = context.len(), "list memory packed");

        let refs: Vec<&str> = context.iter().map(String::as_str).collect();
        self.digester.digest(&refs, probe).await
    }

    async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use theatre_core::types::CompletionOptions;
    use theatre_test_utils::MockProvider;

    #[tokio::test]
    async fn empty_list_skips_completion() {
        let provider = Arc::new(MockProvider::new());
        let idx = ListMemoryIndex::new(Digester::new(provider.clone(), CompletionOptions::default()));
        assert_eq!(idx.query("probe").await.unwrap(), "");
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn digest_includes_all_entries_when_they_fit() {
        let provider = Arc::new(MockProvider::with_responses(vec!["summary".to_string()]));
        let idx = ListMemoryIndex::new(Digester::new(provider.clone(), CompletionOptions::default()));
        idx.insert("Alice: hi").await.unwrap();
        idx.insert("Bob: hey").await.unwrap();

        assert_eq!(idx.query("what happened?").await.unwrap(), "summary");
        let prompts = provider.prompts().await;
        assert!(prompts[0].contains("Alice: hi\nBob: hey"));
    }

    #[tokio::test]
    async fn oldest_entries_drop_when_over_budget() {
        let provider = Arc::new(MockProvider::new());
        let options = CompletionOptions {
            max_tokens: 10,
            context_window: 80,
            ..CompletionOptions::default()
        };
        let idx = ListMemoryIndex::new(Digester::new(provider.clone(), options));
        idx.insert(&"x".repeat(200)).await.unwrap();
        idx.insert("Bob: newest").await.unwrap();

        idx.query("q").await.unwrap();
        let prompts = provider.prompts().await;
        assert!(prompts[0].contains("Bob: newest"));
        assert!(!prompts[0].contains("xxxx"));
    }

    #[tokio::test]
    async fn entries_are_a_superset_in_order() {
        let idx = ListMemoryIndex::new(Digester::new(
            Arc::new(MockProvider::new()),
            CompletionOptions::default(),
        ));
        for line in ["A: 1", "B: 2"] {
            idx.insert(line).await.unwrap();
        }
        assert_eq!(idx.entries().await, vec!["A: 1", "B: 2"]);
    }
}
