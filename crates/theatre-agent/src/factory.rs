// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles fresh agents and sessions from configuration.
//!
//! One factory is built at startup and shared; every session it creates gets
//! its own pair of agents with empty memories.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use theatre_config::TheatreConfig;
use theatre_config::model::ProviderConfig;
use theatre_context::{PromptTemplates, render_preamble};
use theatre_core::traits::{EmbeddingAdapter, ProviderAdapter};
use theatre_core::types::CompletionOptions;
use theatre_memory::LongTermFactory;

use crate::agent::ConversationAgent;
use crate::session::{ConversationSession, Party, SessionSettings};
use crate::sink::OutputSink;

/// Generation options for every request, taken from the `[provider]` section.
pub fn completion_options(config: &ProviderConfig) -> CompletionOptions {
    CompletionOptions {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        context_window: config.context_window,
        stop: config.stop.clone(),
    }
}

#[derive(Clone)]
pub struct SessionFactory {
    settings: SessionSettings,
    templates: PromptTemplates,
    options: CompletionOptions,
    provider: Arc<dyn ProviderAdapter>,
    memory: LongTermFactory,
}

impl SessionFactory {
    pub fn new(
        settings: SessionSettings,
        templates: PromptTemplates,
        options: CompletionOptions,
        provider: Arc<dyn ProviderAdapter>,
        memory: LongTermFactory,
    ) -> Self {
        Self {
            settings,
            templates,
            options,
            provider,
            memory,
        }
    }

    pub fn from_config(
        config: &TheatreConfig,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Self {
        let options = completion_options(&config.provider);
        let memory = LongTermFactory::new(
            &config.memory,
            provider.clone(),
            embedder,
            options.clone(),
        );
        Self::new(
            SessionSettings::from(&config.conversation),
            PromptTemplates::from(&config.prompt),
            options,
            provider,
            memory,
        )
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// A fresh agent for `party`, whose preamble names its partner and the activity.
    pub fn agent(&self, party: Party) -> ConversationAgent {
        let name = self.settings.alias(party);
        let preamble = render_preamble(
            &self.templates.preamble_template,
            name,
            self.settings.partner(party),
            &self.settings.activity,
        );
        ConversationAgent::new(
            name,
            self.memory.build(),
            self.provider.clone(),
            self.options.clone(),
        )
        .with_short_term_capacity(self.settings.short_term_capacity)
        .with_identity_preamble(preamble)
        .with_templates(&self.templates)
    }

    /// A new session with two fresh agents writing to `sink`.
    pub fn session<S: OutputSink>(
        &self,
        sink: S,
        cancel: CancellationToken,
    ) -> ConversationSession<S> {
        ConversationSession::new(
            self.settings.clone(),
            self.agent(Party::A),
            self.agent(Party::B),
            sink,
            cancel,
        )
    }
}

impl std::fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("settings", &self.settings)
            .field("options", &self.options)
            .field("index", &self.memory.kind())
            .finish_non_exhaustive()
    }
}
