// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! captures every prompt it receives and can be told to start failing,
//! enabling fast, CI-runnable tests without a model server.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use theatre_core::TheatreError;
use theatre_core::traits::{PluginAdapter, ProviderAdapter};
use theatre_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};

/// Leading text of every long-term memory digest prompt.
pub const DIGEST_PROMPT_PREFIX: &str = "Context information is below.";

/// Text returned when the response queue is empty.
pub const DEFAULT_RESPONSE: &str = "mock response";

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<String>,
    prompts: Vec<String>,
    fail_after: Option<usize>,
}

/// A mock completion provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_RESPONSE`] is returned. A provider built with
/// [`MockProvider::conversational`] answers digest prompts with a fixed
/// summary so the queue only feeds conversation lines.
#[derive(Debug, Default)]
pub struct MockProvider {
    state: Mutex<State>,
    digest_reply: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            state: Mutex::new(State {
                responses: responses.into(),
                ..State::default()
            }),
            digest_reply: None,
        }
    }

    /// Answers digest prompts with `summary`; other prompts pop `lines` in order.
    pub fn conversational(summary: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            digest_reply: Some(summary.into()),
            ..Self::with_responses(lines)
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.state.lock().await.responses.push_back(text);
    }

    /// Every call from the `n`th (zero-based) onward fails with a completion error.
    pub async fn fail_after(&self, n: usize) {
        self.state.lock().await.fail_after = Some(n);
    }

    /// All prompts received so far, in call order, including failed calls.
    pub async fn prompts(&self) -> Vec<String> {
        self.state.lock().await.prompts.clone()
    }

    /// Prompts that were not digest prompts.
    pub async fn utterance_prompts(&self) -> Vec<String> {
        self.prompts()
            .await
            .into_iter()
            .filter(|p| !p.starts_with(DIGEST_PROMPT_PREFIX))
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.state.lock().await.prompts.len()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TheatreError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TheatreError> {
        let mut state = self.state.lock().await;
        let call = state.prompts.len();
        state.prompts.push(request.prompt.clone());

        if state.fail_after.is_some_and(|n| call >= n) {
            return Err(TheatreError::completion(format!("mock failure on call {call}")));
        }

        let text = match &self.digest_reply {
            Some(summary) if request.prompt.starts_with(DIGEST_PROMPT_PREFIX) => summary.clone(),
            _ => state
                .responses
                .pop_front()
                .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()),
        };

        Ok(ProviderResponse {
            text,
            model: "mock-model".to_string(),
            stop_reason: Some("stop".to_string()),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
            }),
        })
    }
}
