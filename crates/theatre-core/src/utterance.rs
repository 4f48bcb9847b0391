// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Utterances and their canonical `"{speaker}: {text}"` rendering.
//!
//! The rendered line is what every memory tier stores, so nothing downstream
//! needs the structured form.

use serde::{Deserialize, Serialize};

/// Separator between speaker and text in a rendered line.
pub const SPEAKER_DELIMITER: &str = ": ";

/// Renders `text` spoken by `speaker` as a canonical display line.
pub fn format_line(text: &str, speaker: &str) -> String {
    let mut line = String::with_capacity(speaker.len() + SPEAKER_DELIMITER.len() + text.len());
    line.push_str(speaker);
    line.push_str(SPEAKER_DELIMITER);
    line.push_str(text);
    line
}

/// One party's single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Utterance {
    text: String,
    speaker: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// Canonical rendered form.
    pub fn render(&self) -> String {
        format_line(&self.text, &self.speaker)
    }

    /// Splits a rendered line at the first delimiter.
    ///
    /// Lossless whenever the speaker itself does not contain `": "`; the text
    /// may contain any number of delimiters.
    pub fn parse(line: &str) -> Option<Self> {
        let (speaker, text) = line.split_once(SPEAKER_DELIMITER)?;
        Some(Self::new(text, speaker))
    }
}

impl std::fmt::Display for Utterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.speaker, SPEAKER_DELIMITER, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_line_basic() {
        assert_eq!(format_line("hi", "Alice"), "Alice: hi");
    }

    #[test]
    fn format_line_empty_text() {
        assert_eq!(format_line("", "Bob"), "Bob: ");
    }

    #[test]
    fn render_matches_format_line() {
        let u = Utterance::new("good to meet you", "Bob");
        assert_eq!(u.render(), format_line("good to meet you", "Bob"));
        assert_eq!(u.to_string(), u.render());
    }

    #[test]
    fn parse_text_containing_delimiter() {
        let line = format_line("note: this has: colons", "Alice");
        let parsed = Utterance::parse(&line).unwrap();
        assert_eq!(parsed.speaker(), "Alice");
        assert_eq!(parsed.text(), "note: this has: colons");
    }

    #[test]
    fn parse_speaker_containing_delimiter_is_lossy() {
        let line = format_line("hello", "Dr: Who");
        let parsed = Utterance::parse(&line).unwrap();
        assert_eq!(parsed.speaker(), "Dr");
        assert_eq!(parsed.text(), "Who: hello");
    }

    #[test]
    fn parse_without_delimiter_fails() {
        assert!(Utterance::parse("no delimiter here").is_none());
    }

    proptest! {
        #[test]
        fn round_trip_when_speaker_has_no_delimiter(
            speaker in "[A-Za-z][A-Za-z0-9 _-]{0,15}",
            text in ".{0,64}",
        ) {
            prop_assume!(!speaker.contains(SPEAKER_DELIMITER));
            let line = format_line(&text, &speaker);
            let parsed = Utterance::parse(&line).unwrap();
            prop_assert_eq!(parsed.speaker(), speaker.as_str());
            prop_assert_eq!(parsed.text(), text.as_str());
        }
    }
}
