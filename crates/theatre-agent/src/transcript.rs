// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session's single, ordered record of everything said.

use theatre_core::Utterance;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    utterances: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, utterance: Utterance) {
        self.utterances.push(utterance);
    }

    /// Rendered lines in conversational order.
    pub fn lines(&self) -> Vec<String> {
        self.utterances.iter().map(Utterance::render).collect()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_renders() {
        let mut t = Transcript::new();
        assert!(t.is_empty());
        t.push(Utterance::new("hi", "Alice"));
        t.push(Utterance::new("hey: there", "Bob"));
        assert_eq!(t.len(), 2);
        assert_eq!(t.lines(), vec!["Alice: hi", "Bob: hey: there"]);
    }
}
