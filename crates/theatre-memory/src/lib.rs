// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-tier memory for Theatre conversation agents.
//!
//! ## Architecture
//!
//! - **ShortTermMemory**: bounded window of the most recent lines
//! - **LongTermMemory**: append-only store queried for a digest of relevant lines
//! - **VectorMemoryIndex**: embedding similarity, top-k digest
//! - **ListMemoryIndex**: unranked, newest-first digest
//! - **HashEmbedder**: local deterministic embeddings for the vector index
//! - **LongTermFactory**: one store per agent from config

pub mod embedder;
pub mod factory;
pub mod list;
pub mod long_term;
pub mod short_term;
pub mod types;
pub mod vector;

pub use embedder::HashEmbedder;
pub use factory::LongTermFactory;
pub use list::ListMemoryIndex;
pub use long_term::{Digester, LongTermMemory};
pub use short_term::ShortTermMemory;
pub use types::*;
pub use vector::VectorMemoryIndex;
