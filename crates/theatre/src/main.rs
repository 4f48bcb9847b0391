// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Theatre - two autonomous agents with two-tier memory, talking to each other.
//!
//! This is the binary entry point: `theatre run` prints one conversation to
//! stdout, `theatre serve` streams conversations over HTTP, and
//! `theatre config` prints the effective configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod adapters;
mod run;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::error;

use theatre_agent::shutdown;
use theatre_config::{ConfigError, TheatreConfig, render_errors};
use theatre_core::TheatreError;

/// Theatre - two autonomous agents with two-tier memory, talking to each other.
#[derive(Parser, Debug)]
#[command(name = "theatre", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of searching the standard config locations.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one conversation and print it to stdout.
    Run(ConversationArgs),
    /// Serve conversations as Server-Sent Events.
    Serve(ServeArgs),
    /// Print the effective configuration as TOML.
    Config,
}

/// Per-run overrides for the `[conversation]` and `[provider]` sections.
#[derive(Args, Debug, Default)]
struct ConversationArgs {
    /// Name of the first speaker.
    #[arg(short = 'a', long)]
    a_name: Option<String>,
    /// Name of the second speaker.
    #[arg(short = 'b', long)]
    b_name: Option<String>,
    /// What the two are doing together, e.g. "on a first date".
    #[arg(long)]
    activity: Option<String>,
    /// First speaker's opening line.
    #[arg(long)]
    a_starter: Option<String>,
    /// Second speaker's opening line.
    #[arg(long)]
    b_starter: Option<String>,
    /// Number of generated turns after the two opening lines.
    #[arg(short = 'i', long, conflicts_with = "unbounded")]
    max_turns: Option<u64>,
    /// Keep talking until interrupted.
    #[arg(long)]
    unbounded: bool,
    /// Lines kept in each agent's short-term window.
    #[arg(long)]
    short_term_capacity: Option<usize>,
    /// Model name sent to the completion server.
    #[arg(short = 'm', long)]
    model: Option<String>,
    /// Base URL of the OpenAI-compatible server, up to and including `/v1`.
    #[arg(long)]
    base_url: Option<String>,
}

impl ConversationArgs {
    fn apply(&self, config: &mut TheatreConfig) {
        let conversation = &mut config.conversation;
        if let Some(name) = &self.a_name {
            conversation.a_name = name.clone();
        }
        if let Some(name) = &self.b_name {
            conversation.b_name = name.clone();
        }
        if let Some(activity) = &self.activity {
            conversation.activity = activity.clone();
        }
        if let Some(starter) = &self.a_starter {
            conversation.a_starter = Some(starter.clone());
        }
        if let Some(starter) = &self.b_starter {
            conversation.b_starter = Some(starter.clone());
        }
        if let Some(max_turns) = self.max_turns {
            conversation.max_turns = max_turns;
            conversation.unbounded = false;
        }
        if self.unbounded {
            conversation.unbounded = true;
        }
        if let Some(capacity) = self.short_term_capacity {
            conversation.short_term_capacity = capacity;
        }
        if let Some(model) = &self.model {
            config.provider.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.provider.base_url = base_url.clone();
        }
    }
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    #[command(flatten)]
    conversation: ConversationArgs,
    /// Address to bind.
    #[arg(long)]
    host: Option<String>,
    /// Port to bind.
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    fn apply(&self, config: &mut TheatreConfig) {
        self.conversation.apply(config);
        if let Some(host) = &self.host {
            config.gateway.host = host.clone();
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TheatreConfig, Vec<ConfigError>> {
    match path {
        Some(path) => theatre_config::load_and_validate_path(path),
        None => theatre_config::load_and_validate(),
    }
}

/// Loads the configuration, applies command-line overrides and re-validates.
fn resolve_config(cli: &Cli) -> Result<TheatreConfig, Vec<ConfigError>> {
    let mut config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Run(args) => args.apply(&mut config),
        Commands::Serve(args) => args.apply(&mut config),
        Commands::Config => {}
    }
    theatre_config::validation::validate_config(&config)?;
    Ok(config)
}

fn print_config(config: &TheatreConfig) -> Result<(), TheatreError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| TheatreError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Logs go to stderr so stdout carries only the conversation.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("theatre={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Run(_) => {
            let cancel = shutdown::install_signal_handler();
            run::run_conversation(&config, cancel).await.map(|_| ())
        }
        Commands::Serve(_) => {
            let cancel = shutdown::install_signal_handler();
            serve::run_serve(&config, cancel).await
        }
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        error!(error = %e, "theatre exited with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_override_config() {
        let cli = Cli::parse_from([
            "theatre", "run", "-a", "Ann", "-b", "Ben", "-i", "3", "--activity", "hiking",
            "-m", "llama", "--base-url", "http://localhost:9000/v1",
        ]);
        let Commands::Run(args) = &cli.command else {
            panic!("expected run");
        };
        let mut config = TheatreConfig::default();
        args.apply(&mut config);
        assert_eq!(config.conversation.a_name, "Ann");
        assert_eq!(config.conversation.b_name, "Ben");
        assert_eq!(config.conversation.turn_limit(), Some(3));
        assert_eq!(config.conversation.activity, "hiking");
        assert_eq!(config.provider.model, "llama");
        assert_eq!(config.provider.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn unbounded_flag_clears_turn_limit() {
        let cli = Cli::parse_from(["theatre", "run", "--unbounded"]);
        let Commands::Run(args) = &cli.command else {
            panic!("expected run");
        };
        let mut config = TheatreConfig::default();
        args.apply(&mut config);
        assert_eq!(config.conversation.turn_limit(), None);
    }

    #[test]
    fn max_turns_conflicts_with_unbounded() {
        let result = Cli::try_parse_from(["theatre", "run", "-i", "3", "--unbounded"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_flags_override_gateway() {
        let cli = Cli::parse_from(["theatre", "serve", "--host", "0.0.0.0", "-p", "9001", "-a", "Zed"]);
        let Commands::Serve(args) = &cli.command else {
            panic!("expected serve");
        };
        let mut config = TheatreConfig::default();
        args.apply(&mut config);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 9001);
        assert_eq!(config.conversation.a_name, "Zed");
    }

    #[test]
    fn printed_config_round_trips() {
        let mut config = TheatreConfig::default();
        config.conversation.a_name = "Ann".into();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let loaded = theatre_config::load_config_from_str(&rendered).unwrap();
        assert_eq!(loaded.conversation.a_name, "Ann");
    }
}
