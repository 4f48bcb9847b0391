// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates and placeholder substitution.
//!
//! Templates use `{name}` style placeholders. Substitution is a single
//! left-to-right pass over the template: a value that itself contains
//! placeholder text is copied verbatim and never re-expanded, and
//! placeholders with no supplied value are left as they are.

use theatre_config::model::PromptConfig;

/// Identity preamble for an agent with no partner or scene.
pub const DEFAULT_PREAMBLE_TEMPLATE: &str = "Your name is {name}. \
    We provide conversation context between you and other users below. \
    You are at work with someone else. \n";

/// Identity preamble used by sessions; names the partner and the shared activity.
pub const SESSION_PREAMBLE_TEMPLATE: &str = "Your name is {name}. \
    You are {activity} with another person named {partner}. \
    We provide conversation context between you and {partner} below. ";

/// Question-answer template for generating the next utterance.
pub const DEFAULT_QA_TEMPLATE: &str = "{context_str}\
    Given the context information, perform the following task.\n\
    Task: {query_str}\n\
    You: ";

/// Task handed to the question-answer template on every turn.
pub const DEFAULT_INSTRUCTION: &str = "Generate the next message in the conversation.";

/// Probe sent to long-term memory; `{window}` is the flattened short-term window.
pub const DEFAULT_PROBE_TEMPLATE: &str = "Tell me a bit more about any context that's relevant \
    to the current messages: \n{window}";

/// Template long-term memory uses to digest retrieved entries.
pub const DIGEST_QA_TEMPLATE: &str = "Context information is below. \n\
    ---------------------\n\
    {context_str}\n\
    ---------------------\n\
    Given the context information and not prior knowledge, \
    answer the question: {query_str}\n";

/// Substitutes `{key}` placeholders in `template` with the matching values.
///
/// Runs in one pass. Braces that do not enclose a known key are copied
/// through unchanged, including unmatched `{`.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders an identity preamble for `name`.
pub fn render_preamble(template: &str, name: &str, partner: &str, activity: &str) -> String {
    fill_template(
        template,
        &[("name", name), ("partner", partner), ("activity", activity)],
    )
}

/// Renders the long-term memory probe for a flattened window.
pub fn render_probe(template: &str, window: &str) -> String {
    fill_template(template, &[("window", window)])
}

/// The set of templates an agent generates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub preamble_template: String,
    pub qa_template: String,
    pub instruction: String,
    pub probe_template: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            preamble_template: DEFAULT_PREAMBLE_TEMPLATE.to_string(),
            qa_template: DEFAULT_QA_TEMPLATE.to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            probe_template: DEFAULT_PROBE_TEMPLATE.to_string(),
        }
    }
}

impl From<&PromptConfig> for PromptTemplates {
    fn from(config: &PromptConfig) -> Self {
        Self {
            preamble_template: config.preamble_template.clone(),
            qa_template: config.qa_template.clone(),
            instruction: config.instruction.clone(),
            probe_template: config.probe_template.clone(),
        }
    }
}

/// Assembles the final generation prompt for one agent.
///
/// Holds the already-rendered identity preamble; each call fills the
/// question-answer template with a fresh context block.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    identity_preamble: String,
    qa_template: String,
}

impl PromptBuilder {
    pub fn new(identity_preamble: impl Into<String>, qa_template: impl Into<String>) -> Self {
        Self {
            identity_preamble: identity_preamble.into(),
            qa_template: qa_template.into(),
        }
    }

    pub fn identity_preamble(&self) -> &str {
        &self.identity_preamble
    }

    pub fn qa_template(&self) -> &str {
        &self.qa_template
    }

    /// `identity_preamble + "\n" + qa_template` with context and query filled.
    pub fn build(&self, context_block: &str, instruction: &str) -> String {
        build_prompt(
            &self.identity_preamble,
            &self.qa_template,
            context_block,
            instruction,
        )
    }

    /// Characters the prompt costs before any context is added.
    pub fn overhead_chars(&self, instruction: &str) -> usize {
        self.build("", instruction).chars().count()
    }
}

/// Builds a prompt from an identity preamble and a question-answer template.
///
/// The preamble is joined to the template before substitution, so a
/// preamble may itself carry `{context_str}` or `{query_str}`.
pub fn build_prompt(
    identity_preamble: &str,
    qa_template: &str,
    context_block: &str,
    instruction: &str,
) -> String {
    let full = format!("{identity_preamble}\n{qa_template}");
    fill_template(
        &full,
        &[("context_str", context_block), ("query_str", instruction)],
    )
}
