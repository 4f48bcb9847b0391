// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway that streams conversations as Server-Sent Events.
//!
//! Every `GET /stream` runs its own pair of agents; the number of
//! simultaneous conversations is capped by `agent.max_sessions`.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, HealthState, ServerConfig, router, start_server};
pub use sse::{END_EVENT, END_MARKER, ERROR_EVENT, NEW_MESSAGE_EVENT, StreamSettings};
