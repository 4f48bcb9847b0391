// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context engine for Theatre prompt assembly.
//!
//! Two stages turn an agent's memories into one completion prompt:
//! - **Synthesizer**: merges the long-term summary and the short-term window
//!   into a single context block within the model's character budget
//! - **Prompt builder**: wraps that block in the agent's identity preamble
//!   and question-answer template

pub mod prompt;
pub mod synthesizer;

pub use prompt::{
    DEFAULT_INSTRUCTION, DEFAULT_PREAMBLE_TEMPLATE, DEFAULT_PROBE_TEMPLATE, DEFAULT_QA_TEMPLATE,
    DIGEST_QA_TEMPLATE, PromptBuilder, PromptTemplates, SESSION_PREAMBLE_TEMPLATE, build_prompt,
    fill_template, render_preamble, render_probe,
};
pub use synthesizer::{CHARS_PER_TOKEN, ContextSynthesizer, char_budget, keep_tail};
