// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Theatre conversation simulator.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Theatre configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TheatreConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// The two parties and the scene they play.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Prompt templates.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Text-completion endpoint settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Long-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// HTTP streaming gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Every key `theatre.toml` accepts, grouped by section, in file order.
pub const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("agent", &["log_level", "max_sessions"]),
    (
        "conversation",
        &[
            "a_name",
            "b_name",
            "activity",
            "a_starter",
            "b_starter",
            "max_turns",
            "unbounded",
            "short_term_capacity",
        ],
    ),
    (
        "prompt",
        &["preamble_template", "qa_template", "instruction", "probe_template"],
    ),
    (
        "provider",
        &[
            "base_url",
            "api_key",
            "model",
            "max_tokens",
            "temperature",
            "context_window",
            "timeout_secs",
            "stop",
        ],
    ),
    (
        "memory",
        &[
            "index",
            "embedder",
            "embedding_model",
            "embedding_dim",
            "similarity_top_k",
        ],
    ),
    ("gateway", &["host", "port", "event_delay_ms", "stream_retry_ms"]),
];

/// Section names in file order.
pub fn section_names() -> impl Iterator<Item = &'static str> {
    SECTION_KEYS.iter().map(|(section, _)| *section)
}

/// Keys accepted inside `[section]`, or `None` for an unknown section.
pub fn section_keys(section: &str) -> Option<&'static [&'static str]> {
    SECTION_KEYS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of concurrently running conversation sessions (gateway).
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_sessions() -> usize {
    10
}

/// The two parties, their scene, and how long they talk.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Alias of the party that speaks first.
    #[serde(default = "default_a_name")]
    pub a_name: String,

    /// Alias of the second party.
    #[serde(default = "default_b_name")]
    pub b_name: String,

    /// Scene description, e.g. "on a first date".
    #[serde(default = "default_activity")]
    pub activity: String,

    /// Opening line for party A. `None` uses "Hi, my name is {a_name}!".
    #[serde(default)]
    pub a_starter: Option<String>,

    /// Opening line for party B. `None` uses "Hi, my name is {b_name}!".
    #[serde(default)]
    pub b_starter: Option<String>,

    /// Number of generated turns after the two starter lines.
    #[serde(default = "default_max_turns")]
    pub max_turns: u64,

    /// Ignore `max_turns` and run until cancelled or the consumer disconnects.
    #[serde(default)]
    pub unbounded: bool,

    /// Capacity of each agent's short-term window.
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            a_name: default_a_name(),
            b_name: default_b_name(),
            activity: default_activity(),
            a_starter: None,
            b_starter: None,
            max_turns: default_max_turns(),
            unbounded: false,
            short_term_capacity: default_short_term_capacity(),
        }
    }
}

impl ConversationConfig {
    /// The turn bound: `None` when the conversation is unbounded.
    pub fn turn_limit(&self) -> Option<u64> {
        if self.unbounded {
            None
        } else {
            Some(self.max_turns)
        }
    }

    /// Party A's opening line, falling back to a greeting naming the party.
    pub fn a_opening(&self) -> String {
        opening_line(self.a_starter.as_deref(), &self.a_name)
    }

    /// Party B's opening line, falling back to a greeting naming the party.
    pub fn b_opening(&self) -> String {
        opening_line(self.b_starter.as_deref(), &self.b_name)
    }
}

fn opening_line(starter: Option<&str>, name: &str) -> String {
    match starter {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => format!("Hi, my name is {name}!"),
    }
}

fn default_a_name() -> String {
    "Alice".to_string()
}

fn default_b_name() -> String {
    "Bob".to_string()
}

fn default_activity() -> String {
    "on a first date".to_string()
}

fn default_max_turns() -> u64 {
    100
}

fn default_short_term_capacity() -> usize {
    20
}

/// Prompt templates.
///
/// `preamble_template` recognizes `{name}`, `{partner}` and `{activity}`;
/// `qa_template` recognizes `{context_str}` and `{query_str}`;
/// `probe_template` recognizes `{window}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Identity preamble prepended to every generation prompt.
    #[serde(default = "default_preamble_template")]
    pub preamble_template: String,

    /// Question-answer template wrapping the synthesized context.
    #[serde(default = "default_qa_template")]
    pub qa_template: String,

    /// Fixed task instruction filled into `{query_str}`.
    #[serde(default = "default_instruction")]
    pub instruction: String,

    /// Probe sent to long-term memory, built from the short-term window.
    #[serde(default = "default_probe_template")]
    pub probe_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            preamble_template: default_preamble_template(),
            qa_template: default_qa_template(),
            instruction: default_instruction(),
            probe_template: default_probe_template(),
        }
    }
}

fn default_preamble_template() -> String {
    "Your name is {name}. \
     You are {activity} with another person named {partner}. \
     We provide conversation context between you and {partner} below. "
        .to_string()
}

fn default_qa_template() -> String {
    "{context_str}\
     Given the context information, perform the following task.\n\
     Task: {query_str}\n\
     You: "
        .to_string()
}

fn default_instruction() -> String {
    "Generate the next message in the conversation.".to_string()
}

fn default_probe_template() -> String {
    "Tell me a bit more about any context that's relevant \
     to the current messages: \n{window}"
        .to_string()
}

/// OpenAI-compatible text-completion endpoint configuration.
///
/// Works with llama.cpp's server, Ollama, vLLM and OpenAI itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL up to and including the API version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. `None` falls back to `OPENAI_API_KEY`, then to no auth.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens generated per utterance.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Model context window in tokens, used to budget the prompt.
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Stop sequences.
    #[serde(default)]
    pub stop: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            context_window: default_context_window(),
            timeout_secs: default_timeout_secs(),
            stop: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_model() -> String {
    "local".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.8
}

fn default_context_window() -> u32 {
    512
}

fn default_timeout_secs() -> u64 {
    120
}

/// Long-term memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Index kind backing each agent's long-term memory.
    #[serde(default)]
    pub index: IndexKind,

    /// Embedding backend for the vector index.
    #[serde(default)]
    pub embedder: EmbedderKind,

    /// Model name for the remote embedder.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector size for the local hashing embedder.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Number of most similar entries fed into the digest.
    #[serde(default = "default_similarity_top_k")]
    pub similarity_top_k: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            index: IndexKind::default(),
            embedder: EmbedderKind::default(),
            embedding_model: default_embedding_model(),
            embedding_dim: default_embedding_dim(),
            similarity_top_k: default_similarity_top_k(),
        }
    }
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_embedding_dim() -> usize {
    384
}

fn default_similarity_top_k() -> usize {
    2
}

/// Embedding backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Local deterministic feature-hashing embedder; no service required.
    #[default]
    Hash,
    /// The provider's `/embeddings` endpoint.
    Remote,
}

/// Long-term index selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Embedding-similarity index; digest over the top-k matches.
    #[default]
    Vector,
    /// Unranked list index; digest over every entry that fits.
    List,
}

/// HTTP streaming gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum delay between streamed events, in milliseconds.
    #[serde(default = "default_event_delay_ms")]
    pub event_delay_ms: u64,

    /// Reconnect hint sent with every event, in milliseconds.
    #[serde(default = "default_stream_retry_ms")]
    pub stream_retry_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            event_delay_ms: default_event_delay_ms(),
            stream_retry_ms: default_stream_retry_ms(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_event_delay_ms() -> u64 {
    1000
}

fn default_stream_retry_ms() -> u64 {
    15000
}
