// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Theatre integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock completion provider with queued responses,
//!   prompt capture and failure injection
//! - [`FailingEmbedder`] - Embedding adapter that always errors
//! - [`CancellingEmbedder`] - Hash embedder that fires a cancellation token
//!   partway through a recorded line
//! - [`TestHarness`] - Full session stack around the mocks

pub mod harness;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{HARNESS_SUMMARY, TestHarness, TestHarnessBuilder};
pub use mock_embedder::{CancellingEmbedder, FailingEmbedder};
pub use mock_provider::{DEFAULT_RESPONSE, DIGEST_PROMPT_PREFIX, MockProvider};
