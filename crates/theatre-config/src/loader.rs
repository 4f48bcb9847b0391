// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./theatre.toml` > `~/.config/theatre/theatre.toml` > `/etc/theatre/theatre.toml`
//! with environment variable overrides via `THEATRE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::{TheatreConfig, section_names};

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/theatre/theatre.toml` (system-wide)
/// 3. `~/.config/theatre/theatre.toml` (user XDG config)
/// 4. `./theatre.toml` (local directory)
/// 5. `THEATRE_*` environment variables
pub fn load_config() -> Result<TheatreConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config content.
pub fn load_config_from_str(toml_content: &str) -> Result<TheatreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TheatreConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TheatreConfig, figment::Error> {
    debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(TheatreConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
///
/// The last entry is relative: figment looks for it in the working
/// directory and its parents.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/theatre/theatre.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("theatre").join("theatre.toml"));
    }
    paths.push(PathBuf::from("theatre.toml"));
    paths
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(TheatreConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `THEATRE_CONVERSATION_SHORT_TERM_CAPACITY` must map to
/// `conversation.short_term_capacity`, not `conversation.short.term.capacity`.
fn env_provider() -> Env {
    Env::prefixed("THEATRE_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to its dotted config path.
///
/// Names that do not start with a known section are passed through unchanged
/// and surface later as unknown-key errors.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in section_names() {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
