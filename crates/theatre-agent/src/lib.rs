// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation agents and the session loop for Theatre.
//!
//! - [`ConversationAgent`]: one participant with short- and long-term memory
//! - [`ConversationSession`]: two agents taking turns, writing to an [`OutputSink`]
//! - [`SessionFactory`]: builds fresh sessions from configuration
//! - [`shutdown`]: signal handling feeding a cancellation token

pub mod agent;
pub mod factory;
pub mod session;
pub mod shutdown;
pub mod sink;
pub mod transcript;

pub use agent::ConversationAgent;
pub use factory::{SessionFactory, completion_options};
pub use session::{ConversationSession, Party, SessionOutcome, SessionSettings};
pub use sink::{BufferSink, ChannelSink, OutputSink, SessionEvent, StdoutSink, WriterSink};
pub use transcript::Transcript;
