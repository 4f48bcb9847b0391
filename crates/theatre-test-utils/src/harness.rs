// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session testing.
//!
//! `TestHarness` assembles a complete session stack around a [`MockProvider`]
//! and the local hash embedder, so a whole conversation can run in a test
//! without any model server.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use theatre_agent::{
    BufferSink, ConversationSession, OutputSink, SessionFactory, SessionOutcome,
};
use theatre_config::TheatreConfig;
use theatre_config::model::IndexKind;
use theatre_core::TheatreError;
use theatre_core::traits::EmbeddingAdapter;
use theatre_memory::HashEmbedder;

use crate::mock_provider::MockProvider;

/// Summary the harness provider returns for every digest prompt.
pub const HARNESS_SUMMARY: &str = "They are getting to know each other.";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    config: TheatreConfig,
    fail_after: Option<usize>,
    embedder: Option<Arc<dyn EmbeddingAdapter>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            config: TheatreConfig::default(),
            fail_after: None,
            embedder: None,
        }
    }

    /// Conversation lines the provider returns, in order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_names(mut self, a: &str, b: &str) -> Self {
        self.config.conversation.a_name = a.to_string();
        self.config.conversation.b_name = b.to_string();
        self
    }

    pub fn with_starters(mut self, a: &str, b: &str) -> Self {
        self.config.conversation.a_starter = Some(a.to_string());
        self.config.conversation.b_starter = Some(b.to_string());
        self
    }

    /// `None` makes the conversation unbounded.
    pub fn with_max_turns(mut self, max_turns: Option<u64>) -> Self {
        match max_turns {
            Some(n) => {
                self.config.conversation.max_turns = n;
                self.config.conversation.unbounded = false;
            }
            None => self.config.conversation.unbounded = true,
        }
        self
    }

    pub fn with_short_term_capacity(mut self, capacity: usize) -> Self {
        self.config.conversation.short_term_capacity = capacity;
        self
    }

    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.config.memory.index = index;
        self
    }

    /// Provider calls from the `n`th onward fail.
    pub fn with_failure_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: TheatreConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> TestHarness {
        let mock_provider = Arc::new(MockProvider::conversational(
            HARNESS_SUMMARY,
            self.responses,
        ));
        if let Some(n) = self.fail_after {
            mock_provider.fail_after(n).await;
        }
        let embedder: Arc<dyn EmbeddingAdapter> = match self.embedder {
            Some(embedder) => embedder,
            None => Arc::new(HashEmbedder::new(self.config.memory.embedding_dim)),
        };
        let factory = SessionFactory::from_config(&self.config, mock_provider.clone(), embedder);

        TestHarness {
            mock_provider,
            factory,
            config: self.config,
        }
    }
}

/// A complete session stack backed by mock adapters.
pub struct TestHarness {
    /// The mock completion provider shared by both agents.
    pub mock_provider: Arc<MockProvider>,
    pub factory: SessionFactory,
    pub config: TheatreConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A fresh session writing to `sink`.
    pub fn session<S: OutputSink>(&self, sink: S) -> ConversationSession<S> {
        self.factory.session(sink, CancellationToken::new())
    }

    /// Runs a whole session into a buffer and returns the outcome with the sink.
    pub async fn run_to_buffer(&self) -> (Result<SessionOutcome, TheatreError>, BufferSink) {
        let mut session = self.session(BufferSink::new());
        let outcome = session.run().await;
        (outcome, session.into_sink())
    }
}
