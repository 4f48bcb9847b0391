// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment failures into diagnostics that point into `theatre.toml`.
//!
//! Unknown sections and keys are checked against
//! [`SECTION_KEYS`](crate::model::SECTION_KEYS), so the
//! help text names the `[section]` the key was found in and offers the
//! closest accepted key. Keys that came from `THEATRE_*` variables are
//! reported by variable name instead of by file position.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::{Path, PathBuf};

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::{section_keys, section_names};

/// Jaro-Winkler score a candidate must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

const ENV_PREFIX: &str = "THEATRE_";

/// A configuration problem, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A `[section]` that `theatre.toml` does not have.
    #[error("unknown section `[{section}]`")]
    #[diagnostic(code(theatre::config::unknown_section), help("{hint}"))]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        hint: String,
        #[label("no such section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key its section does not accept.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(code(theatre::config::unknown_key), help("{hint}"))]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        hint: String,
        #[label("not a [{section}] key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for `{key}`: {detail}")]
    #[diagnostic(code(theatre::config::invalid_type), help("`{key}` takes {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `conversation.max_turns`.
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A string outside a fixed set, such as `memory.index`.
    #[error("`{value}` is not a valid `{key}`")]
    #[diagnostic(code(theatre::config::unknown_variant), help("use one of: {allowed}"))]
    UnknownVariant {
        key: String,
        value: String,
        allowed: String,
        #[label("not allowed here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but is out of range or inconsistent.
    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(code(theatre::config::validation))]
    Validation {
        /// Dotted path of the offending key, e.g. `conversation.short_term_capacity`.
        key: String,
        message: String,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(theatre::config::other))]
    Other(String),
}

/// The text of one TOML source, kept for span lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    /// Canonical location on disk; `None` for inline TOML.
    path: Option<PathBuf>,
    content: String,
}

impl SourceFile {
    /// Reads `path` the way figment resolves it. Relative paths are looked
    /// up in the working directory and then its parents.
    pub fn read(path: &Path) -> Option<Self> {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .ok()?
                .ancestors()
                .map(|dir| dir.join(path))
                .find(|candidate| candidate.is_file())?
        };
        let content = std::fs::read_to_string(&resolved).ok()?;
        let canonical = std::fs::canonicalize(&resolved).unwrap_or(resolved);
        Some(Self {
            name: canonical.display().to_string(),
            path: Some(canonical),
            content,
        })
    }

    pub fn inline(content: &str) -> Self {
        Self {
            name: "<inline>".to_string(),
            path: None,
            content: content.to_string(),
        }
    }
}

/// Where a failing value came from.
#[derive(Debug, Clone, Copy)]
enum Origin<'a> {
    File(&'a SourceFile),
    Environment,
    Unknown,
}

/// What a figment error points at: a whole section or one key in it.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Section(&'a str),
    Key(&'a str, &'a str),
}

impl Target<'_> {
    fn offset_in(&self, file: &SourceFile) -> Option<usize> {
        match *self {
            Target::Section(section) => locate_section(&file.content, section),
            Target::Key(section, key) => locate_key(&file.content, Some(section), key),
        }
    }

    fn len(&self) -> usize {
        match *self {
            Target::Section(section) => section.len(),
            Target::Key(_, key) => key.len(),
        }
    }

    fn set_in_environment(&self) -> bool {
        match *self {
            Target::Section(section) => {
                let var = format!("{ENV_PREFIX}{section}").to_uppercase();
                std::env::vars().any(|(name, _)| {
                    name.strip_prefix(var.as_str())
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('_'))
                })
            }
            Target::Key(section, key) => std::env::var_os(env_var_name(section, key)).is_some(),
        }
    }

    fn span(&self, origin: Origin<'_>) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        match origin {
            Origin::File(file) => attach(file, self.offset_in(file), self.len()),
            _ => (None, None),
        }
    }
}

/// Finds the source of `target`, trusting figment's metadata first and
/// falling back to searching the sources, newest layer first.
fn origin<'a>(error: &figment::Error, target: Target<'_>, sources: &'a [SourceFile]) -> Origin<'a> {
    if let Some(metadata) = error.metadata.as_ref() {
        if let Some(figment::Source::File(path)) = metadata.source.as_ref() {
            let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
            if let Some(file) = sources
                .iter()
                .find(|s| s.path.as_deref() == Some(canonical.as_path()))
                .filter(|file| target.offset_in(file).is_some())
            {
                return Origin::File(file);
            }
        } else if metadata.name.contains("environment") {
            return Origin::Environment;
        }
    }
    if let Some(file) = sources.iter().rev().find(|file| target.offset_in(file).is_some()) {
        return Origin::File(file);
    }
    if target.set_in_environment() {
        return Origin::Environment;
    }
    Origin::Unknown
}

/// Name of the `THEATRE_*` variable that sets `section.key`.
pub fn env_var_name(section: &str, key: &str) -> String {
    format!("{ENV_PREFIX}{section}_{key}").to_uppercase()
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &[SourceFile]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<&str> = error.path.iter().map(String::as_str).collect();
            match (&error.kind, path.as_slice()) {
                (Kind::UnknownField(field, _), []) => {
                    let target = Target::Section(field);
                    unknown_section(field, target, origin(&error, target, sources))
                }
                (Kind::UnknownField(field, expected), [section, ..]) => {
                    let target = Target::Key(section, field);
                    unknown_key(section, field, expected, target, origin(&error, target, sources))
                }
                (Kind::InvalidType(actual, expected), _) => {
                    let (span, src) = value_span(&error, &path, sources);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}"),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                (Kind::UnknownVariant(value, allowed), _) => {
                    let (span, src) = value_span(&error, &path, sources);
                    ConfigError::UnknownVariant {
                        key: path.join("."),
                        value: value.clone(),
                        allowed: allowed.join(", "),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn unknown_section(section: &str, target: Target<'_>, origin: Origin<'_>) -> ConfigError {
    let names: Vec<&str> = section_names().collect();
    let suggestion = suggest_key(section, &names);
    let listing = names
        .iter()
        .map(|name| format!("[{name}]"))
        .collect::<Vec<_>>()
        .join(", ");
    let hint = match (&suggestion, origin) {
        (_, Origin::Environment) => format!(
            "`{}` does not start with a section name; theatre.toml has {listing}",
            format!("{ENV_PREFIX}{section}").to_uppercase()
        ),
        (Some(s), _) => format!("did you mean [{s}]? theatre.toml has {listing}"),
        (None, _) => format!("theatre.toml has {listing}"),
    };
    let (span, src) = target.span(origin);
    ConfigError::UnknownSection {
        section: section.to_string(),
        suggestion,
        hint,
        span,
        src,
    }
}

fn unknown_key(
    section: &str,
    key: &str,
    expected: &'static [&'static str],
    target: Target<'_>,
    origin: Origin<'_>,
) -> ConfigError {
    let accepted = section_keys(section).unwrap_or(expected);
    let suggestion = suggest_key(key, accepted);
    let hint = match (&suggestion, origin) {
        (Some(s), Origin::Environment) => format!(
            "`{}` is not read; did you mean `{}`?",
            env_var_name(section, key),
            env_var_name(section, s)
        ),
        (Some(s), _) => format!("did you mean `{s}`? [{section}] accepts: {}", accepted.join(", ")),
        (None, _) => format!("[{section}] accepts: {}", accepted.join(", ")),
    };
    let (span, src) = target.span(origin);
    ConfigError::UnknownKey {
        section: section.to_string(),
        key: key.to_string(),
        suggestion,
        hint,
        span,
        src,
    }
}

/// Span of the key that holds a bad value, for `[section] key = ...` paths.
fn value_span(
    error: &figment::Error,
    path: &[&str],
    sources: &[SourceFile],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    match path {
        [section, key] => {
            let target = Target::Key(section, key);
            target.span(origin(error, target, sources))
        }
        _ => (None, None),
    }
}

fn attach(
    file: &SourceFile,
    offset: Option<usize>,
    len: usize,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    match offset {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), len)),
            Some(NamedSource::new(&file.name, file.content.clone())),
        ),
        None => (None, None),
    }
}

/// The table name in a `[header]` line, ignoring any trailing comment.
fn table_header(line: &str) -> Option<&str> {
    let code = line.split('#').next().unwrap_or_default().trim();
    let name = code.strip_prefix('[')?.strip_suffix(']')?;
    Some(name.trim())
}

/// Byte offset of `key = ...` inside `[section]`, or before any header when
/// `section` is `None`.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(name) = table_header(trimmed) {
            current = Some(name);
        } else if current == section
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Byte offset of the name inside a `[section]` header.
pub fn locate_section(content: &str, section: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if table_header(trimmed) == Some(section) {
            let indent = line.len() - trimmed.len();
            let inner = trimmed[1..].len() - trimmed[1..].trim_start().len();
            return Some(offset + indent + 1 + inner);
        }
        offset += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// All errors rendered with `handler`, followed by a one-line count.
pub fn render_report(handler: &GraphicalReportHandler, errors: &[ConfigError]) -> String {
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    let noun = if errors.len() == 1 { "problem" } else { "problems" };
    out.push_str(&format!(
        "{} configuration {noun}; sections and keys are listed by `theatre config`\n",
        errors.len()
    ));
    out
}

/// Prints every error to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_report(&GraphicalReportHandler::new(), errors));
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::GraphicalTheme;

    fn plain_handler() -> GraphicalReportHandler {
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()).with_width(400)
    }

    fn errors_for(toml: &str) -> Vec<ConfigError> {
        let err = crate::load_config_from_str(toml).unwrap_err();
        figment_to_config_errors(err, &[SourceFile::inline(toml)])
    }

    #[test]
    fn suggests_a_name_for_transposed_typo() {
        let valid = &["a_name", "b_name", "activity", "max_turns"];
        assert_eq!(suggest_key("a_nmae", valid), Some("a_name".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        assert_eq!(suggest_key("zzzzzz", &["log_level", "max_sessions"]), None);
    }

    #[test]
    fn locate_key_tracks_the_current_table() {
        let content = "[agent]\nport = 1\n\n[gateway] # server\n  port = 2\n";
        let o = locate_key(content, Some("gateway"), "port").unwrap();
        assert!(content[o..].starts_with("port = 2"));
        assert_eq!(locate_key(content, Some("memory"), "port"), None);
    }

    #[test]
    fn locate_key_ignores_longer_keys() {
        let content = "[memory]\nembedding_dim_x = 3\nembedding_dim = 4\n";
        let o = locate_key(content, Some("memory"), "embedding_dim").unwrap();
        assert!(content[o..].starts_with("embedding_dim = 4"));
    }

    #[test]
    fn locate_section_points_at_the_name() {
        let content = "[agent]\n[ telegram ]\n";
        let o = locate_section(content, "telegram").unwrap();
        assert!(content[o..].starts_with("telegram"));
    }

    #[test]
    fn unknown_key_names_its_section_and_span() {
        let toml = "[conversation]\na_nmae = \"Ann\"\n";
        let errors = errors_for(toml);
        match &errors[..] {
            [ConfigError::UnknownKey { section, key, suggestion, hint, span, .. }] => {
                assert_eq!(section, "conversation");
                assert_eq!(key, "a_nmae");
                assert_eq!(suggestion.as_deref(), Some("a_name"));
                assert!(hint.starts_with("did you mean `a_name`? [conversation] accepts: a_name, b_name"));
                let span = span.unwrap();
                assert_eq!(&toml[span.offset()..span.offset() + span.len()], "a_nmae");
            }
            other => panic!("expected one UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn unknown_section_lists_theatre_sections() {
        let errors = errors_for("[conversaton]\na_name = \"Ann\"\n");
        match &errors[..] {
            [ConfigError::UnknownSection { section, suggestion, hint, span, .. }] => {
                assert_eq!(section, "conversaton");
                assert_eq!(suggestion.as_deref(), Some("conversation"));
                assert!(hint.contains("[agent], [conversation], [prompt]"), "{hint}");
                assert!(span.is_some());
            }
            other => panic!("expected one UnknownSection, got {other:?}"),
        }
    }

    #[test]
    fn bad_index_lists_allowed_values() {
        let errors = errors_for("[memory]\nindex = \"tree\"\n");
        match &errors[..] {
            [ConfigError::UnknownVariant { key, value, allowed, .. }] => {
                assert_eq!(key, "memory.index");
                assert_eq!(value, "tree");
                assert!(allowed.contains("vector") && allowed.contains("list"));
            }
            other => panic!("expected one UnknownVariant, got {other:?}"),
        }
    }

    #[test]
    fn environment_typo_is_reported_by_variable_name() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("THEATRE_CONVERSATION_A_NMAE", "Ann");
            let err = crate::load_config_from_path(Path::new("absent.toml")).unwrap_err();
            let errors = figment_to_config_errors(err, &[]);
            match &errors[..] {
                [ConfigError::UnknownKey { hint, span, .. }] => {
                    assert_eq!(
                        hint,
                        "`THEATRE_CONVERSATION_A_NMAE` is not read; did you mean `THEATRE_CONVERSATION_A_NAME`?"
                    );
                    assert!(span.is_none());
                }
                other => panic!("expected one UnknownKey, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn report_ends_with_a_count() {
        let errors = errors_for("[conversation]\na_nmae = \"Ann\"\n");
        let report = render_report(&plain_handler(), &errors);
        assert!(report.contains("unknown key `a_nmae` in [conversation]"), "{report}");
        assert!(report.contains("did you mean `a_name`?"), "{report}");
        assert!(report.ends_with("1 configuration problem; sections and keys are listed by `theatre config`\n"));
    }

    #[test]
    fn env_var_names_are_upper_snake() {
        assert_eq!(env_var_name("memory", "similarity_top_k"), "THEATRE_MEMORY_SIMILARITY_TOP_K");
    }
}
