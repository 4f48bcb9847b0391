// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The long-term memory contract and the digest step its implementations share.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use theatre_context::{DIGEST_QA_TEMPLATE, char_budget, fill_template};
use theatre_core::traits::{PluginAdapter, ProviderAdapter};
use theatre_core::types::CompletionOptions;
use theatre_core::{ExternalService, TheatreError};

/// Append-only store of every line an agent has seen.
///
/// Implementations take `&self` for inserts and guard their entries
/// internally, so concurrent inserts never drop a line.
#[async_trait]
pub trait LongTermMemory: Send + Sync {
    /// Adds one canonical line.
    async fn insert(&self, text: &str) -> Result<(), TheatreError>;

    /// Returns a natural-language digest of the entries most relevant to `probe`.
    ///
    /// An empty store yields an empty digest without contacting any service.
    async fn query(&self, probe: &str) -> Result<String, TheatreError>;

    /// Every entry in insertion order.
    async fn entries(&self) -> Vec<String>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Turns a set of retrieved entries into a compact answer to a probe.
#[derive(Clone)]
pub struct Digester {
    provider: Arc<dyn ProviderAdapter>,
    options: CompletionOptions,
    template: String,
}

impl Digester {
    pub fn new(provider: Arc<dyn ProviderAdapter>, options: CompletionOptions) -> Self {
        Self {
            provider,
            options,
            template: DIGEST_QA_TEMPLATE.to_string(),
        }
    }

    /// Replaces the digest template. It must carry `{context_str}` and `{query_str}`.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Characters available for entries once the template and probe are in place.
    pub fn context_budget(&self, probe: &str) -> usize {
        let overhead = fill_template(&self.template, &[("context_str", ""), ("query_str", probe)])
            .chars()
            .count();
        char_budget(self.options.context_window, self.options.max_tokens, overhead)
    }

    /// Asks the completion service to answer `probe` from `context`.
    pub async fn digest(&self, context: &[&str], probe: &str) -> Result<String, TheatreError> {
        let context_str = context.join("\n");
        let prompt = fill_template(
            &self.template,
            &[("context_str", context_str.as_str()), ("query_str", probe)],
        );
        debug!(entries = context.len(), prompt_chars = prompt.len(), "digesting long-term memory");

        let response = self
            .provider
            .complete(self.options.request(prompt))
            .await
            .map_err(|e| TheatreError::ExternalService {
                service: ExternalService::MemoryQuery,
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(response.text.trim().to_string())
    }
}

impl std::fmt::Debug for Digester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digester")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .finish()
    }
}

/// The longest suffix of `entries` whose lines, joined by `"\n"`, fit in `budget` chars.
///
/// Always keeps at least the final entry so a digest never runs on nothing.
pub fn pack_newest<'a>(entries: &'a [String], budget: usize) -> Vec<&'a str> {
    let mut used = 0usize;
    let mut start = entries.len();
    for (i, entry) in entries.iter().enumerate().rev() {
        let cost = entry.chars().count() + usize::from(start != entries.len());
        if start != entries.len() && used + cost > budget {
            break;
        }
        used += cost;
        start = i;
    }
    entries[start..].iter().map(String::as_str).collect()
}

/// The longest prefix of `entries` that fits in `budget` chars, keeping at least one.
pub fn pack_leading<'a>(entries: &[&'a str], budget: usize) -> Vec<&'a str> {
    let mut used = 0usize;
    let mut kept = Vec::new();
    for entry in entries {
        let cost = entry.chars().count() + usize::from(!kept.is_empty());
        if !kept.is_empty() && used + cost > budget {
            break;
        }
        used += cost;
        kept.push(*entry);
    }
    kept
}
