// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Theatre conversation simulator.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Theatre workspace: the utterance
//! formatter, the completion and embedding adapter contracts, and the shared
//! error enum.

pub mod error;
pub mod traits;
pub mod types;
pub mod utterance;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ExternalService, TheatreError};
pub use types::{
    AdapterType, CompletionOptions, EmbeddingInput, EmbeddingOutput, HealthStatus,
    ProviderRequest, ProviderResponse, SessionId, TokenUsage,
};
pub use utterance::{format_line, Utterance};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
