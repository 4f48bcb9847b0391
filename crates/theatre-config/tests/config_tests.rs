// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Theatre configuration system.

use std::path::Path;

use theatre_config::diagnostic::{ConfigError, suggest_key};
use theatre_config::model::{EmbedderKind, IndexKind, TheatreConfig};
use theatre_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_theatre_config() {
    let toml = r#"
[agent]
log_level = "debug"
max_sessions = 4

[conversation]
a_name = "Romeo"
b_name = "Juliet"
activity = "at a masquerade ball"
a_starter = "What light through yonder window breaks?"
max_turns = 12
short_term_capacity = 6

[prompt]
instruction = "Reply in verse."

[provider]
base_url = "https://api.example.com/v1"
api_key = "sk-test"
model = "gpt-3.5-turbo-instruct"
max_tokens = 64
temperature = 0.5
context_window = 2048
stop = ["\n"]

[memory]
index = "list"
embedder = "remote"
embedding_model = "text-embedding-3-small"

[gateway]
host = "0.0.0.0"
port = 9000
event_delay_ms = 0
stream_retry_ms = 3000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.max_sessions, 4);
    assert_eq!(config.conversation.a_name, "Romeo");
    assert_eq!(config.conversation.b_name, "Juliet");
    assert_eq!(config.conversation.activity, "at a masquerade ball");
    assert_eq!(
        config.conversation.a_opening(),
        "What light through yonder window breaks?"
    );
    assert_eq!(config.conversation.b_opening(), "Hi, my name is Juliet!");
    assert_eq!(config.conversation.turn_limit(), Some(12));
    assert_eq!(config.conversation.short_term_capacity, 6);
    assert_eq!(config.prompt.instruction, "Reply in verse.");
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.provider.max_tokens, 64);
    assert_eq!(config.provider.context_window, 2048);
    assert_eq!(config.provider.stop, vec!["\n".to_string()]);
    assert_eq!(config.memory.index, IndexKind::List);
    assert_eq!(config.memory.embedder, EmbedderKind::Remote);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.event_delay_ms, 0);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.agent.max_sessions, 10);
    assert_eq!(config.conversation.a_name, "Alice");
    assert_eq!(config.conversation.b_name, "Bob");
    assert_eq!(config.conversation.activity, "on a first date");
    assert_eq!(config.conversation.a_opening(), "Hi, my name is Alice!");
    assert_eq!(config.conversation.turn_limit(), Some(100));
    assert_eq!(config.conversation.short_term_capacity, 20);
    assert!(config.prompt.qa_template.starts_with("{context_str}"));
    assert!(config.prompt.qa_template.ends_with("Task: {query_str}\nYou: "));
    assert_eq!(config.provider.max_tokens, 150);
    assert_eq!(config.provider.context_window, 512);
    assert!(config.provider.api_key.is_none());
    assert_eq!(config.memory.index, IndexKind::Vector);
    assert_eq!(config.memory.embedder, EmbedderKind::Hash);
    assert_eq!(config.memory.similarity_top_k, 2);
    assert_eq!(config.gateway.port, 8000);
}

/// `unbounded` wins over `max_turns`.
#[test]
fn unbounded_clears_turn_limit() {
    let toml = r#"
[conversation]
max_turns = 5
unbounded = true
"#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.conversation.turn_limit(), None);
}

/// A blank starter falls back to the greeting.
#[test]
fn blank_starter_falls_back_to_greeting() {
    let toml = r#"
[conversation]
b_starter = "   "
"#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.conversation.b_opening(), "Hi, my name is Bob!");
}

/// Unknown field in [conversation] produces an error mentioning the key.
#[test]
fn unknown_field_in_conversation_produces_error() {
    let toml = r#"
[conversation]
a_nmae = "Ann"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("a_nmae"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Unknown key flows through load_and_validate_str as an UnknownKey with a suggestion and span.
#[test]
fn load_and_validate_str_suggests_typo_fix() {
    let toml = r#"
[conversation]
a_nmae = "Ann"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "a_nmae");
            assert_eq!(suggestion.as_deref(), Some("a_name"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value type surfaces as InvalidType with the dotted key path.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[conversation]
max_turns = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key == "conversation.max_turns"
    )));
}

/// Unknown enum variant for the index kind is rejected.
#[test]
fn unknown_index_kind_is_rejected() {
    let toml = r#"
[memory]
index = "tree"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

/// Validation failures come through load_and_validate_str.
#[test]
fn load_and_validate_str_runs_validation() {
    let toml = r#"
[conversation]
short_term_capacity = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("capacity 0 must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { key, .. } if key == "conversation.short_term_capacity"
    )));
}

// Path-based loading reads THEATRE_* env vars, so these run inside a
// figment Jail to serialize against the env override test.

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_file_silently_skipped() {
    figment::Jail::expect_with(|_jail| {
        let config = load_config_from_path(Path::new("/nonexistent/path/theatre.toml"))?;
        assert_eq!(config.conversation.a_name, "Alice");
        Ok(())
    });
}

/// A file on disk is loaded and validated.
#[test]
fn load_and_validate_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theatre.toml");
    std::fs::write(&path, "[conversation]\na_name = \"Ann\"\n").unwrap();

    figment::Jail::expect_with(|_jail| {
        let config = load_and_validate_path(&path).expect("file should validate");
        assert_eq!(config.conversation.a_name, "Ann");
        Ok(())
    });
}

/// Typos in a file on disk get a suggestion.
#[test]
fn load_and_validate_path_suggests_typo_fix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theatre.toml");
    std::fs::write(&path, "[gateway]\nprot = 1\n").unwrap();

    figment::Jail::expect_with(|_jail| {
        let errors = load_and_validate_path(&path).expect_err("should fail");
        match &errors[0] {
            ConfigError::UnknownKey { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("port"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}

/// THEATRE_* environment variables override file values, with underscores
/// inside key names preserved.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "theatre.toml",
            r#"
[conversation]
a_name = "from-file"
short_term_capacity = 3
"#,
        )?;
        jail.set_env("THEATRE_CONVERSATION_A_NAME", "from-env");
        jail.set_env("THEATRE_CONVERSATION_SHORT_TERM_CAPACITY", "7");
        jail.set_env("THEATRE_PROVIDER_API_KEY", "sk-env");

        let config = load_config_from_path(Path::new("theatre.toml"))?;
        assert_eq!(config.conversation.a_name, "from-env");
        assert_eq!(config.conversation.short_term_capacity, 7);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
        Ok(())
    });
}

/// Serialized defaults round-trip through TOML unchanged.
#[test]
fn defaults_serialize_to_loadable_toml() {
    let rendered = toml::to_string(&TheatreConfig::default()).expect("defaults serialize");
    let config = load_and_validate_str(&rendered).expect("rendered defaults validate");
    assert_eq!(config.prompt.preamble_template, TheatreConfig::default().prompt.preamble_template);
}

/// The fuzzy matcher is exported for callers outside the crate.
#[test]
fn suggest_key_is_public() {
    assert_eq!(
        suggest_key("similarity_topk", &["similarity_top_k", "embedding_dim"]),
        Some("similarity_top_k".to_string())
    );
}
