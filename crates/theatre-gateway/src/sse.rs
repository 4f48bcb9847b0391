// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for `GET /` and `GET /stream`.
//!
//! Each request starts a fresh conversation and streams it:
//! ```text
//! event: new_message
//! data: Alice: Hi, my name is Alice!
//!
//! event: end_event
//! data: [END]
//! ```
//! A failed conversation ends with an `error` event carrying the message.
//! Dropping the connection cancels the conversation.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;
use tracing::{debug, info, warn};

use theatre_agent::{ChannelSink, SessionEvent};

use crate::handlers::ErrorResponse;
use crate::server::GatewayState;

pub const NEW_MESSAGE_EVENT: &str = "new_message";
pub const END_EVENT: &str = "end_event";
pub const ERROR_EVENT: &str = "error";
/// Data carried by the terminal `end_event`.
pub const END_MARKER: &str = "[END]";

/// Pacing and reconnect hints for the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Minimum spacing between consecutive events.
    pub event_delay: Duration,
    /// Reconnect hint sent with every event.
    pub retry: Duration,
}

/// Maps a session event onto its SSE form.
pub fn to_sse_event(event: &SessionEvent, retry: Duration) -> Event {
    let (name, data) = match event {
        SessionEvent::Message(line) => (NEW_MESSAGE_EVENT, line.as_str()),
        SessionEvent::End => (END_EVENT, END_MARKER),
        SessionEvent::Error(message) => (ERROR_EVENT, message.as_str()),
    };
    Event::default().event(name).data(data).retry(retry)
}

/// GET / and GET /stream
pub async fn stream_conversation(State(state): State<GatewayState>) -> Response {
    let Ok(permit) = state.sessions.clone().try_acquire_owned() else {
        warn!(max_sessions = state.max_sessions, "session limit reached, rejecting stream");
        return ErrorResponse {
            error: format!(
                "too many concurrent conversations (limit {})",
                state.max_sessions
            ),
        }
        .into_response_with(StatusCode::SERVICE_UNAVAILABLE);
    };

    let cancel = state.shutdown.child_token();
    let (sink, rx) = ChannelSink::pair(1);
    let mut session = state.factory.session(sink, cancel.clone());
    let session_id = session.id().clone();
    info!(session_id = %session_id, "stream opened");

    tokio::spawn(async move {
        let _permit = permit;
        if let Err(e) = session.run().await {
            debug!(session_id = %session_id, error = %e, "stream session ended with error");
        }
    });

    Sse::new(event_stream(rx, state.stream, cancel.drop_guard()))
        .keep_alive(KeepAlive::default())
        .into_response()
}

struct StreamState {
    rx: mpsc::Receiver<SessionEvent>,
    settings: StreamSettings,
    first: bool,
    done: bool,
    // Cancels the session when the client goes away and the stream is dropped.
    _guard: DropGuard,
}

fn event_stream(
    rx: mpsc::Receiver<SessionEvent>,
    settings: StreamSettings,
    guard: DropGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let state = StreamState {
        rx,
        settings,
        first: true,
        done: false,
        _guard: guard,
    };
    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        let event = state.rx.recv().await?;
        if !state.first && !state.settings.event_delay.is_zero() {
            tokio::time::sleep(state.settings.event_delay).await;
        }
        state.first = false;
        state.done = event.is_terminal();
        let sse = to_sse_event(&event, state.settings.retry);
        Some((Ok(sse), state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_util::sync::CancellationToken;

    fn settings() -> StreamSettings {
        StreamSettings {
            event_delay: Duration::ZERO,
            retry: Duration::from_millis(15_000),
        }
    }

    #[tokio::test]
    async fn stream_stops_after_terminal_event() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(SessionEvent::Message("Alice: hi".into())).await.unwrap();
        tx.send(SessionEvent::End).await.unwrap();
        tx.send(SessionEvent::Message("never".into())).await.unwrap();

        let token = CancellationToken::new();
        let events: Vec<_> = event_stream(rx, settings(), token.clone().drop_guard())
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert!(token.is_cancelled(), "dropping the stream cancels the session");
    }

    #[tokio::test]
    async fn closed_channel_ends_stream() {
        let (tx, rx) = mpsc::channel::<SessionEvent>(1);
        drop(tx);
        let token = CancellationToken::new();
        let events: Vec<_> = event_stream(rx, settings(), token.drop_guard()).collect().await;
        assert!(events.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_spaced_by_delay() {
        let (tx, rx) = mpsc::channel(4);
        for line in ["a", "b", "c"] {
            tx.send(SessionEvent::Message(line.into())).await.unwrap();
        }
        drop(tx);
        let delayed = StreamSettings {
            event_delay: Duration::from_secs(1),
            ..settings()
        };

        let start = tokio::time::Instant::now();
        let events: Vec<_> = event_stream(rx, delayed, CancellationToken::new().drop_guard())
            .collect()
            .await;
        assert_eq!(events.len(), 3);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
