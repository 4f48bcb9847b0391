// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two-party conversation loop.
//!
//! A session owns both agents, the shared transcript and the output sink.
//! Every utterance goes through [`ConversationSession::record`], which fans
//! it out to both agents' memories, so the two agents always hold the same
//! history.
//!
//! Lifecycle: bootstrap (both starter lines) -> turns alternating A, B, A, ...
//! -> `Completed` when the turn bound is exhausted, or `Disconnected` when the
//! consumer goes away or the cancellation token fires. An external failure
//! is reported to the sink once and returned.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use theatre_config::model::ConversationConfig;
use theatre_core::types::SessionId;
use theatre_core::{TheatreError, Utterance};

use crate::agent::ConversationAgent;
use crate::sink::{OutputSink, SessionEvent};
use crate::transcript::Transcript;

/// One side of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    A,
    B,
}

impl Party {
    pub fn other(self) -> Self {
        match self {
            Party::A => Party::B,
            Party::B => Party::A,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Party::A => write!(f, "a"),
            Party::B => write!(f, "b"),
        }
    }
}

/// How a session ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The turn bound was exhausted.
    Completed { turns: u64 },
    /// The consumer went away or shutdown was requested.
    Disconnected { turns: u64 },
}

impl SessionOutcome {
    pub fn turns(&self) -> u64 {
        match self {
            SessionOutcome::Completed { turns } | SessionOutcome::Disconnected { turns } => *turns,
        }
    }
}

/// Per-run settings: who talks, how they open and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub a_name: String,
    pub b_name: String,
    pub activity: String,
    pub a_starter: String,
    pub b_starter: String,
    /// `None` runs until the consumer disconnects.
    pub max_turns: Option<u64>,
    pub short_term_capacity: usize,
}

impl From<&ConversationConfig> for SessionSettings {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            a_name: config.a_name.clone(),
            b_name: config.b_name.clone(),
            activity: config.activity.clone(),
            a_starter: config.a_opening(),
            b_starter: config.b_opening(),
            max_turns: config.turn_limit(),
            short_term_capacity: config.short_term_capacity,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ConversationConfig::default())
    }
}

impl SessionSettings {
    pub fn alias(&self, party: Party) -> &str {
        match party {
            Party::A => &self.a_name,
            Party::B => &self.b_name,
        }
    }

    pub fn partner(&self, party: Party) -> &str {
        self.alias(party.other())
    }

    fn starter(&self, party: Party) -> &str {
        match party {
            Party::A => &self.a_starter,
            Party::B => &self.b_starter,
        }
    }
}

/// A running conversation between two agents.
pub struct ConversationSession<S> {
    id: SessionId,
    settings: SessionSettings,
    a: ConversationAgent,
    b: ConversationAgent,
    current: Party,
    turns_taken: u64,
    bootstrapped: bool,
    transcript: Transcript,
    sink: S,
    cancel: CancellationToken,
}

impl<S: OutputSink> ConversationSession<S> {
    pub fn new(
        settings: SessionSettings,
        a: ConversationAgent,
        b: ConversationAgent,
        sink: S,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            settings,
            a,
            b,
            current: Party::A,
            turns_taken: 0,
            bootstrapped: false,
            transcript: Transcript::new(),
            sink,
            cancel,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn agent(&self, party: Party) -> &ConversationAgent {
        match party {
            Party::A => &self.a,
            Party::B => &self.b,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The party whose turn is next.
    pub fn current_speaker(&self) -> Party {
        self.current
    }

    pub fn turns_taken(&self) -> u64 {
        self.turns_taken
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Records `text` spoken by `party` into both agents and the transcript.
    ///
    /// The only write path into agent memory during a session. Never raced
    /// against cancellation, so a cancelled session cannot leave one agent a
    /// line ahead of the other.
    pub async fn record(&mut self, party: Party, text: &str) -> Result<(), TheatreError> {
        let alias = self.settings.alias(party).to_string();
        self.a.add_message(text, &alias).await?;
        self.b.add_message(text, &alias).await?;
        self.transcript.push(Utterance::new(text, alias));
        Ok(())
    }

    /// Seeds both agents with both starter lines and emits them. Idempotent.
    pub async fn bootstrap(&mut self) -> Result<(), TheatreError> {
        if self.bootstrapped {
            return Ok(());
        }
        for party in [Party::A, Party::B] {
            let starter = self.settings.starter(party).to_string();
            self.record(party, &starter).await?;
            let line = Utterance::new(starter, self.settings.alias(party)).render();
            self.sink.emit(SessionEvent::Message(line)).await?;
        }
        self.bootstrapped = true;
        debug!(session_id = %self.id, "session bootstrapped");
        Ok(())
    }

    /// Runs one turn for the current speaker and returns the rendered line.
    ///
    /// Cancellation is honoured while the line is being generated. Once it
    /// exists, it is emitted and recorded into both agents before returning.
    pub async fn step(&mut self) -> Result<String, TheatreError> {
        let party = self.current;
        let cancel = self.cancel.clone();
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TheatreError::Disconnected),
            text = self.agent(party).generate_message(None) => text?,
        };
        let line = Utterance::new(text.as_str(), self.settings.alias(party)).render();

        self.sink.emit(SessionEvent::Message(line.clone())).await?;
        self.record(party, &text).await?;

        self.current = party.other();
        self.turns_taken += 1;
        Ok(line)
    }

    /// Drives the session to its end.
    ///
    /// Returns `Ok` for a completed or disconnected run. On any other error
    /// an [`SessionEvent::Error`] is emitted and the error returned; nothing
    /// is emitted after it.
    pub async fn run(&mut self) -> Result<SessionOutcome, TheatreError> {
        info!(
            session_id = %self.id,
            a = %self.settings.a_name,
            b = %self.settings.b_name,
            max_turns = ?self.settings.max_turns,
            "conversation started"
        );
        match self.drive().await {
            Ok(outcome) => {
                info!(
                    session_id = %self.id,
                    ?outcome,
                    lines = self.transcript.len(),
                    "conversation ended"
                );
                Ok(outcome)
            }
            Err(TheatreError::Disconnected) => {
                info!(session_id = %self.id, turns = self.turns_taken, "consumer disconnected");
                Ok(SessionOutcome::Disconnected {
                    turns: self.turns_taken,
                })
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "conversation failed");
                if self.sink.emit(SessionEvent::Error(e.to_string())).await.is_err() {
                    debug!(session_id = %self.id, "error event not delivered");
                }
                Err(e)
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.sink.is_closed()
    }

    async fn drive(&mut self) -> Result<SessionOutcome, TheatreError> {
        if self.should_stop() {
            return Err(TheatreError::Disconnected);
        }
        self.bootstrap().await?;

        loop {
            if self
                .settings
                .max_turns
                .is_some_and(|max| self.turns_taken >= max)
            {
                self.sink.emit(SessionEvent::End).await?;
                return Ok(SessionOutcome::Completed {
                    turns: self.turns_taken,
                });
            }
            if self.should_stop() {
                return Err(TheatreError::Disconnected);
            }
            self.step().await?;
        }
    }
}

impl<S> std::fmt::Debug for ConversationSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("turns_taken", &self.turns_taken)
            .finish_non_exhaustive()
    }
}
