// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session loop tests driven through the mock harness.

use std::sync::Arc;

use theatre_agent::{BufferSink, ChannelSink, Party, SessionEvent, SessionOutcome};
use theatre_config::TheatreConfig;
use theatre_config::model::IndexKind;
use theatre_core::{ExternalService, TheatreError};
use theatre_test_utils::{CancellingEmbedder, FailingEmbedder, TestHarness};
use tokio_util::sync::CancellationToken;

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn zero_turns_emits_only_starters() {
    let harness = TestHarness::builder()
        .with_max_turns(Some(0))
        .build()
        .await;

    let (outcome, sink) = harness.run_to_buffer().await;
    assert_eq!(outcome.unwrap(), SessionOutcome::Completed { turns: 0 });
    assert_eq!(
        sink.lines(),
        vec!["Alice: Hi, my name is Alice!", "Bob: Hi, my name is Bob!"]
    );
    assert_eq!(sink.events().last(), Some(&SessionEvent::End));
    assert_eq!(harness.mock_provider.call_count().await, 0);
}

#[tokio::test]
async fn turns_alternate_starting_with_a() {
    let harness = TestHarness::builder()
        .with_mock_responses(lines(&["one", "two", "three", "four", "five"]))
        .with_max_turns(Some(5))
        .build()
        .await;

    let (outcome, sink) = harness.run_to_buffer().await;
    assert_eq!(outcome.unwrap().turns(), 5);
    assert_eq!(
        sink.lines()[2..],
        lines(&["Alice: one", "Bob: two", "Alice: three", "Bob: four", "Alice: five"])
    );
}

#[tokio::test]
async fn both_agents_hold_identical_history() {
    let harness = TestHarness::builder()
        .with_mock_responses(lines(&["a1", "b1", "a2", "b2"]))
        .with_max_turns(Some(4))
        .with_short_term_capacity(3)
        .build()
        .await;

    let mut session = harness.session(BufferSink::new());
    session.run().await.unwrap();

    let a = session.agent(Party::A);
    let b = session.agent(Party::B);
    assert_eq!(a.short_term_snapshot(), b.short_term_snapshot());
    assert_eq!(a.short_term_snapshot(), lines(&["Bob: b1", "Alice: a2", "Bob: b2"]));

    let transcript = session.transcript().lines();
    assert_eq!(transcript.len(), 6);
    assert_eq!(a.long_term_entries().await, transcript);
    assert_eq!(b.long_term_entries().await, transcript);
    assert_eq!(session.sink().lines(), transcript);
}

#[tokio::test]
async fn list_index_runs_the_same_loop() {
    let harness = TestHarness::builder()
        .with_index(IndexKind::List)
        .with_mock_responses(lines(&["x", "y"]))
        .with_max_turns(Some(2))
        .build()
        .await;

    let (outcome, sink) = harness.run_to_buffer().await;
    assert!(matches!(outcome, Ok(SessionOutcome::Completed { turns: 2 })));
    assert_eq!(sink.lines()[2..], lines(&["Alice: x", "Bob: y"]));
}

#[tokio::test]
async fn prompts_carry_complementary_preambles() {
    let harness = TestHarness::builder()
        .with_max_turns(Some(2))
        .build()
        .await;
    harness.run_to_buffer().await.0.unwrap();

    let prompts = harness.mock_provider.utterance_prompts().await;
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].starts_with(
        "Your name is Alice. You are on a first date with another person named Bob."
    ));
    assert!(prompts[1].starts_with(
        "Your name is Bob. You are on a first date with another person named Alice."
    ));
    assert!(prompts[0].contains(theatre_test_utils::HARNESS_SUMMARY));
    assert!(prompts[0].ends_with("You: "));
}

#[tokio::test]
async fn custom_names_and_starters() {
    let harness = TestHarness::builder()
        .with_names("Romeo", "Juliet")
        .with_starters("Good morrow.", "Who goes there?")
        .with_max_turns(Some(0))
        .build()
        .await;

    let (_, sink) = harness.run_to_buffer().await;
    assert_eq!(
        sink.lines(),
        vec!["Romeo: Good morrow.", "Juliet: Who goes there?"]
    );
}

#[tokio::test]
async fn external_failure_stops_emission() {
    // Call 0 is the first digest, call 1 the first line, call 2 fails.
    let harness = TestHarness::builder()
        .with_mock_responses(lines(&["first"]))
        .with_max_turns(Some(10))
        .with_failure_after(2)
        .build()
        .await;

    let (outcome, sink) = harness.run_to_buffer().await;
    let err = outcome.unwrap_err();
    assert!(matches!(
        err,
        TheatreError::ExternalService {
            service: ExternalService::MemoryQuery,
            ..
        }
    ));
    assert_eq!(sink.lines().len(), 3);
    assert!(matches!(sink.events().last(), Some(SessionEvent::Error(_))));
    assert_eq!(
        sink.events().iter().filter(|e| e.is_terminal()).count(),
        1
    );
}

#[tokio::test]
async fn embedding_failure_fails_bootstrap_without_output() {
    let harness = TestHarness::builder()
        .with_embedder(Arc::new(FailingEmbedder))
        .build()
        .await;

    let (outcome, sink) = harness.run_to_buffer().await;
    assert!(outcome.unwrap_err().is_external());
    assert!(sink.lines().is_empty());
    assert!(sink.error().is_some());
}

#[tokio::test]
async fn cancelled_before_start_is_disconnected() {
    let harness = TestHarness::builder().build().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut session = harness.factory.session(BufferSink::new(), cancel);
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Disconnected { turns: 0 });
    assert!(session.sink().events().is_empty());
}

#[tokio::test]
async fn dropped_consumer_ends_unbounded_session() {
    let harness = TestHarness::builder()
        .with_max_turns(None)
        .build()
        .await;
    let (sink, mut rx) = ChannelSink::pair(1);
    let mut session = harness.factory.session(sink, CancellationToken::new());
    let task = tokio::spawn(async move { session.run().await });

    for _ in 0..4 {
        assert!(matches!(rx.recv().await, Some(SessionEvent::Message(_))));
    }
    drop(rx);

    let outcome = task.await.unwrap().unwrap();
    assert!(matches!(outcome, SessionOutcome::Disconnected { .. }));
}

#[tokio::test]
async fn cancellation_stops_unbounded_session() {
    let harness = TestHarness::builder()
        .with_max_turns(None)
        .build()
        .await;
    let cancel = CancellationToken::new();
    let (sink, mut rx) = ChannelSink::pair(1);
    let mut session = harness.factory.session(sink, cancel.clone());
    let task = tokio::spawn(async move { session.run().await });

    for _ in 0..3 {
        rx.recv().await.unwrap();
    }
    cancel.cancel();
    // Drain until the session drops its sender.
    while let Some(event) = rx.recv().await {
        assert!(!event.is_terminal());
    }

    let outcome = task.await.unwrap().unwrap();
    assert!(matches!(outcome, SessionOutcome::Disconnected { .. }));
}

#[tokio::test]
async fn cancellation_while_recording_keeps_agents_in_step() {
    let cancel = CancellationToken::new();
    let dim = TheatreConfig::default().memory.embedding_dim;
    // Fires while agent B embeds "a1", after agent A has stored it.
    let embedder = CancellingEmbedder::new(dim, "a1", 2, cancel.clone());
    let harness = TestHarness::builder()
        .with_mock_responses(lines(&["a1", "b1"]))
        .with_max_turns(None)
        .with_embedder(Arc::new(embedder))
        .build()
        .await;

    let mut session = harness.factory.session(BufferSink::new(), cancel.clone());
    let outcome = session.run().await.unwrap();
    assert!(cancel.is_cancelled());
    assert_eq!(outcome, SessionOutcome::Disconnected { turns: 1 });

    let a = session.agent(Party::A);
    let b = session.agent(Party::B);
    let transcript = session.transcript().lines();
    assert_eq!(transcript.last().map(String::as_str), Some("Alice: a1"));
    assert_eq!(a.long_term_entries().await, transcript);
    assert_eq!(b.long_term_entries().await, transcript);
    assert_eq!(a.short_term_snapshot(), b.short_term_snapshot());
    assert_eq!(session.sink().lines(), transcript);
}

#[tokio::test]
async fn step_flips_current_speaker() {
    let harness = TestHarness::builder()
        .with_mock_responses(lines(&["hello"]))
        .build()
        .await;
    let mut session = harness.session(BufferSink::new());

    session.bootstrap().await.unwrap();
    session.bootstrap().await.unwrap();
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.current_speaker(), Party::A);

    let line = session.step().await.unwrap();
    assert_eq!(line, "Alice: hello");
    assert_eq!(session.current_speaker(), Party::B);
    assert_eq!(session.turns_taken(), 1);
}
