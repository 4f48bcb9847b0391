// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single conversation participant: two memory tiers plus a completion handle.
//!
//! Each turn the agent asks its long-term memory for anything relevant to the
//! recent window, folds that summary and the window into one context block,
//! wraps it in its identity preamble and asks the model for the next line.

use std::sync::Arc;

use tracing::debug;

use theatre_context::{
    ContextSynthesizer, DEFAULT_PREAMBLE_TEMPLATE, PromptBuilder, PromptTemplates, char_budget,
    render_preamble, render_probe,
};
use theatre_core::traits::ProviderAdapter;
use theatre_core::types::CompletionOptions;
use theatre_core::{TheatreError, format_line};
use theatre_memory::{LongTermMemory, ShortTermMemory};

/// One memory-augmented conversation participant.
pub struct ConversationAgent {
    name: String,
    short_term: ShortTermMemory,
    long_term: Box<dyn LongTermMemory>,
    prompt: PromptBuilder,
    instruction: String,
    probe_template: String,
    provider: Arc<dyn ProviderAdapter>,
    options: CompletionOptions,
}

impl ConversationAgent {
    /// Creates an agent with the generic preamble and default templates.
    pub fn new(
        name: impl Into<String>,
        long_term: Box<dyn LongTermMemory>,
        provider: Arc<dyn ProviderAdapter>,
        options: CompletionOptions,
    ) -> Self {
        let name = name.into();
        let templates = PromptTemplates::default();
        let preamble = render_preamble(DEFAULT_PREAMBLE_TEMPLATE, &name, "", "");
        Self {
            name,
            short_term: ShortTermMemory::default(),
            long_term,
            prompt: PromptBuilder::new(preamble, templates.qa_template),
            instruction: templates.instruction,
            probe_template: templates.probe_template,
            provider,
            options,
        }
    }

    /// Replaces the identity preamble with an already-rendered one.
    pub fn with_identity_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.prompt = PromptBuilder::new(preamble, self.prompt.qa_template().to_string());
        self
    }

    /// Uses the question-answer template, instruction and probe from `templates`.
    ///
    /// The preamble template is not applied here; render it with the agent's
    /// partner and activity and pass it to [`Self::with_identity_preamble`].
    pub fn with_templates(mut self, templates: &PromptTemplates) -> Self {
        self.prompt = PromptBuilder::new(
            self.prompt.identity_preamble().to_string(),
            templates.qa_template.clone(),
        );
        self.instruction = templates.instruction.clone();
        self.probe_template = templates.probe_template.clone();
        self
    }

    /// Sets the short-term window size. Must be called before any message is added.
    pub fn with_short_term_capacity(mut self, capacity: usize) -> Self {
        self.short_term = ShortTermMemory::new(capacity);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity_preamble(&self) -> &str {
        self.prompt.identity_preamble()
    }

    /// Records a line spoken by `speaker` into both memory tiers.
    pub async fn add_message(&mut self, text: &str, speaker: &str) -> Result<(), TheatreError> {
        let line = format_line(text, speaker);
        self.long_term.insert(&line).await?;
        self.short_term.push(line);
        Ok(())
    }

    /// Produces this agent's next utterance without touching its memory.
    ///
    /// `previous` defaults to the newest short-term line; with neither
    /// available the call fails with [`TheatreError::EmptyMemory`] before any
    /// external service is contacted.
    pub async fn generate_message(&self, previous: Option<&str>) -> Result<String, TheatreError> {
        let previous = previous
            .or_else(|| self.short_term.last())
            .ok_or(TheatreError::EmptyMemory)?;
        debug!(agent = %self.name, previous, "generating next message");

        let window = self.short_term.flatten();
        let probe = render_probe(&self.probe_template, &window);
        let summary = self.long_term.query(&probe).await?;

        let budget = char_budget(
            self.options.context_window,
            self.options.max_tokens,
            self.prompt.overhead_chars(&self.instruction),
        );
        let context = ContextSynthesizer::new(budget).synthesize(&summary, &window);
        let prompt = self.prompt.build(&context, &self.instruction);

        let response = self.provider.complete(self.options.request(prompt)).await?;
        let text = response.text.trim().to_string();
        debug!(agent = %self.name, chars = text.len(), "message generated");
        Ok(text)
    }

    /// The short-term window, oldest first.
    pub fn short_term_snapshot(&self) -> Vec<String> {
        self.short_term.snapshot()
    }

    /// Every line this agent has been given, in insertion order.
    pub async fn long_term_entries(&self) -> Vec<String> {
        self.long_term.entries().await
    }
}

impl std::fmt::Debug for ConversationAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAgent")
            .field("name", &self.name)
            .field("short_term", &self.short_term)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
