// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `theatre run`: one conversation printed to stdout.

use tokio_util::sync::CancellationToken;
use tracing::info;

use theatre_agent::{SessionOutcome, StdoutSink};
use theatre_config::TheatreConfig;
use theatre_core::TheatreError;

use crate::adapters::Adapters;

/// Runs a single conversation until its turn bound or until `cancel` fires.
pub async fn run_conversation(
    config: &TheatreConfig,
    cancel: CancellationToken,
) -> Result<SessionOutcome, TheatreError> {
    let adapters = Adapters::from_config(config)?;
    let mut session = adapters
        .session_factory(config)
        .session(StdoutSink::stdout(), cancel);

    let outcome = session.run().await?;
    info!(turns = outcome.turns(), "conversation finished");
    Ok(outcome)
}
