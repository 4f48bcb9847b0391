// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Theatre conversation simulator.

use strum::Display;
use thiserror::Error;

/// Which external capability failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExternalService {
    /// Text completion (the language model).
    Completion,
    /// Embedding generation for semantic memory.
    Embedding,
    /// Long-term memory digest (retrieval plus summarization).
    MemoryQuery,
}

/// The primary error type used across all Theatre adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TheatreError {
    /// `generate_message` was called with no previous message and an empty
    /// short-term memory.
    #[error("short-term memory is empty and no previous message was supplied")]
    EmptyMemory,

    /// An external capability (completion, embedding, memory query) failed.
    #[error("{service} service error: {message}")]
    ExternalService {
        service: ExternalService,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The downstream consumer of a streaming session has gone away.
    #[error("output consumer disconnected")]
    Disconnected,

    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TheatreError {
    /// Shorthand for a completion failure without an underlying source.
    pub fn completion(message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: ExternalService::Completion,
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an embedding failure without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: ExternalService::Embedding,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when the error came from an external capability.
    /// Transport timeouts are reported as `ExternalService` too.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}
