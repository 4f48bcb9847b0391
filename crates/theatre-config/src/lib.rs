// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Theatre conversation simulator.
//!
//! `theatre.toml` has one table per concern (`[agent]`, `[conversation]`,
//! `[prompt]`, `[provider]`, `[memory]`, `[gateway]`). Files are layered
//! system, user, then local, and `THEATRE_<SECTION>_<KEY>` variables override
//! all of them.
//!
//! ```no_run
//! match theatre_config::load_and_validate() {
//!     Ok(config) => println!("{} meets {}", config.conversation.a_name, config.conversation.b_name),
//!     Err(errors) => theatre_config::render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, SourceFile, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TheatreConfig;

/// Loads every file in [`loader::search_paths`] plus the environment.
pub fn load_and_validate() -> Result<TheatreConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::search_paths()
            .iter()
            .filter_map(|path| SourceFile::read(path))
            .collect()
    })
}

/// Loads one explicit file plus the environment.
pub fn load_and_validate_path(path: &Path) -> Result<TheatreConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        SourceFile::read(path).into_iter().collect()
    })
}

/// Loads inline TOML only.
pub fn load_and_validate_str(toml_content: &str) -> Result<TheatreConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![SourceFile::inline(toml_content)]
    })
}

/// Validates a loaded config, or turns the load failure into diagnostics.
/// Sources are only read when there is something to point into.
fn checked(
    loaded: Result<TheatreConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<SourceFile>,
) -> Result<TheatreConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
