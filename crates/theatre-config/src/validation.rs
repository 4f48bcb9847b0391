// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero capacities, distinct party names, and bindable hosts.

use crate::diagnostic::ConfigError;
use crate::model::{EmbedderKind, IndexKind, TheatreConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TheatreConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |key: &str, message: String| {
        errors.push(ConfigError::Validation {
            key: key.to_string(),
            message,
        });
    };

    if config.agent.max_sessions == 0 {
        fail("agent.max_sessions", "must be at least 1".to_string());
    }

    let conv = &config.conversation;
    if conv.a_name.trim().is_empty() {
        fail("conversation.a_name", "must not be empty".to_string());
    }
    if conv.b_name.trim().is_empty() {
        fail("conversation.b_name", "must not be empty".to_string());
    }
    if !conv.a_name.trim().is_empty() && conv.a_name == conv.b_name {
        fail(
            "conversation.b_name",
            format!("both parties are named `{}`; names must differ", conv.a_name),
        );
    }
    if conv.short_term_capacity == 0 {
        fail(
            "conversation.short_term_capacity",
            "must be at least 1".to_string(),
        );
    }

    let prompt = &config.prompt;
    if !prompt.qa_template.contains("{context_str}") {
        fail(
            "prompt.qa_template",
            "must contain the `{context_str}` placeholder".to_string(),
        );
    }
    if !prompt.qa_template.contains("{query_str}") {
        fail(
            "prompt.qa_template",
            "must contain the `{query_str}` placeholder".to_string(),
        );
    }
    if !prompt.probe_template.contains("{window}") {
        fail(
            "prompt.probe_template",
            "must contain the `{window}` placeholder".to_string(),
        );
    }

    let provider = &config.provider;
    if !(provider.base_url.starts_with("http://") || provider.base_url.starts_with("https://")) {
        fail(
            "provider.base_url",
            format!("`{}` must start with http:// or https://", provider.base_url),
        );
    }
    if provider.model.trim().is_empty() {
        fail("provider.model", "must not be empty".to_string());
    }
    if provider.max_tokens == 0 {
        fail("provider.max_tokens", "must be at least 1".to_string());
    }
    if !(0.0..=2.0).contains(&provider.temperature) {
        fail(
            "provider.temperature",
            format!("must be within 0.0..=2.0, got {}", provider.temperature),
        );
    }
    if provider.context_window <= provider.max_tokens {
        fail(
            "provider.context_window",
            format!(
                "must exceed provider.max_tokens ({}), got {}",
                provider.max_tokens, provider.context_window
            ),
        );
    }
    if provider.timeout_secs == 0 {
        fail("provider.timeout_secs", "must be at least 1".to_string());
    }

    let memory = &config.memory;
    if memory.index == IndexKind::Vector {
        if memory.similarity_top_k == 0 {
            fail("memory.similarity_top_k", "must be at least 1".to_string());
        }
        if memory.embedder == EmbedderKind::Hash && memory.embedding_dim == 0 {
            fail("memory.embedding_dim", "must be at least 1".to_string());
        }
        if memory.embedder == EmbedderKind::Remote && memory.embedding_model.trim().is_empty() {
            fail("memory.embedding_model", "must not be empty".to_string());
        }
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host", "must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(
                "gateway.host",
                format!("`{host}` is not a valid IP address or hostname"),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
