// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded window of the most recent conversation lines.

use std::collections::VecDeque;

/// The last `capacity` canonical lines, oldest first.
///
/// Pushing past capacity evicts from the head, so the window always holds
/// the most recent lines in conversational order.
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ShortTermMemory {
    /// Default window size.
    pub const DEFAULT_CAPACITY: usize = 20;

    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends `line`, then evicts the oldest lines while over capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Lines in chronological order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    /// The window joined with `"\n"`.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_memory() {
        let m = ShortTermMemory::default();
        assert!(m.is_empty());
        assert_eq!(m.snapshot(), Vec::<String>::new());
        assert_eq!(m.flatten(), "");
        assert_eq!(m.last(), None);
        assert_eq!(m.capacity(), 20);
    }

    #[test]
    fn capacity_two_evicts_oldest() {
        let mut m = ShortTermMemory::new(2);
        m.push("A: 1");
        m.push("B: 2");
        m.push("A: 3");
        assert_eq!(m.snapshot(), vec!["B: 2", "A: 3"]);
        assert_eq!(m.last(), Some("A: 3"));
    }

    #[test]
    fn flatten_joins_with_newline() {
        let mut m = ShortTermMemory::new(5);
        m.push("Alice: hi");
        m.push("Bob: hey");
        assert_eq!(m.flatten(), "Alice: hi\nBob: hey");
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_keeps_suffix(
            capacity in 1usize..30,
            lines in proptest::collection::vec("[a-z]{0,8}", 0..80),
        ) {
            let mut m = ShortTermMemory::new(capacity);
            for line in &lines {
                m.push(line.clone());
                prop_assert!(m.len() <= capacity);
            }
            let start = lines.len().saturating_sub(capacity);
            prop_assert_eq!(m.snapshot(), lines[start..].to_vec());
            prop_assert_eq!(m.last(), lines.last().map(String::as_str));
        }
    }
}
