// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context synthesis: folds a long-term summary and the recent window into
//! one context block that fits the model's prompt budget.

use tracing::debug;

/// Rough heuristic used for budgeting: 4 chars per token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Character budget for prompt input given a model's context window.
///
/// Reserves `max_tokens` for generation and subtracts `overhead_chars`
/// (template text that is always present). Saturates at zero.
pub fn char_budget(context_window: u32, max_tokens: u32, overhead_chars: usize) -> usize {
    let input_tokens = context_window.saturating_sub(max_tokens) as usize;
    (input_tokens * CHARS_PER_TOKEN).saturating_sub(overhead_chars)
}

/// Merges the long-term summary with the recent window.
///
/// Nodes are joined by `"\n"` in `[summary, window]` order and blank nodes
/// are skipped. When the block exceeds the budget the summary loses its
/// oldest characters first; the window is only cut once the summary is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSynthesizer {
    char_budget: usize,
}

impl ContextSynthesizer {
    pub fn new(char_budget: usize) -> Self {
        Self { char_budget }
    }

    /// A synthesizer with no length limit.
    pub fn unbounded() -> Self {
        Self {
            char_budget: usize::MAX,
        }
    }

    pub fn char_budget(&self) -> usize {
        self.char_budget
    }

    pub fn synthesize(&self, long_term_summary: &str, recent_window: &str) -> String {
        let summary = long_term_summary.trim();
        let window = recent_window.trim();

        let summary_len = summary.chars().count();
        let window_len = window.chars().count();

        if window_len >= self.char_budget || summary.is_empty() {
            if !summary.is_empty() {
                debug!(
                    dropped_chars = summary_len,
                    "long-term summary dropped to fit budget"
                );
            }
            return keep_tail(window, self.char_budget).to_string();
        }
        if window.is_empty() {
            return keep_tail(summary, self.char_budget).to_string();
        }

        let room = self.char_budget - window_len;
        // One char of `room` goes to the "\n" separator.
        if room <= 1 {
            debug!(dropped_chars = summary_len, "long-term summary dropped to fit budget");
            return window.to_string();
        }
        let kept = keep_tail(summary, room - 1);
        if kept.len() < summary.len() {
            debug!(
                dropped_chars = summary_len - kept.chars().count(),
                "long-term summary truncated to fit budget"
            );
        }
        format!("{kept}\n{window}")
    }
}

impl Default for ContextSynthesizer {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// The last `max_chars` characters of `text`, on a char boundary.
pub fn keep_tail(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    let skip = total - max_chars;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}
