// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where a session's output goes.
//!
//! A session emits one [`SessionEvent::Message`] per rendered line, then
//! exactly one terminal event: [`SessionEvent::End`] when the turn bound is
//! exhausted or [`SessionEvent::Error`] when an external call fails. A sink
//! whose consumer has gone away reports [`TheatreError::Disconnected`].

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use theatre_core::TheatreError;

/// One item of session output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A rendered `"{speaker}: {text}"` line.
    Message(String),
    /// The turn bound was reached.
    End,
    /// The session stopped on a failure; carries the error message.
    Error(String),
}

impl SessionEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Message(_))
    }
}

/// Consumer of session output.
#[async_trait]
pub trait OutputSink: Send {
    /// Delivers one event, failing with `Disconnected` if the consumer is gone.
    async fn emit(&mut self, event: SessionEvent) -> Result<(), TheatreError>;

    /// Whether the consumer is known to be gone. Checked between turns.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Writes each line to stdout as soon as it is produced.
///
/// Terminal events are not printed; the caller reports errors itself.
pub struct WriterSink<W> {
    writer: W,
}

/// Sink used by the command-line mode.
pub type StdoutSink = WriterSink<tokio::io::Stdout>;

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> OutputSink for WriterSink<W> {
    async fn emit(&mut self, event: SessionEvent) -> Result<(), TheatreError> {
        let SessionEvent::Message(line) = event else {
            return Ok(());
        };
        let write = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        };
        write.await.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => TheatreError::Disconnected,
            _ => TheatreError::Internal(format!("failed to write output: {e}")),
        })
    }
}

/// Collects every event; the lines are read back after the run.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    events: Vec<SessionEvent>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Message(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// The error message, if the session ended on a failure.
    pub fn error(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            SessionEvent::Error(msg) => Some(msg.as_str()),
            _ => None,
        })
    }
}

#[async_trait]
impl OutputSink for BufferSink {
    async fn emit(&mut self, event: SessionEvent) -> Result<(), TheatreError> {
        self.events.push(event);
        Ok(())
    }
}

/// Forwards each event over a bounded channel as soon as it is produced.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// A sink and the receiver its events arrive on.
    pub fn pair(buffer: usize) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl OutputSink for ChannelSink {
    async fn emit(&mut self, event: SessionEvent) -> Result<(), TheatreError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| TheatreError::Disconnected)
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
