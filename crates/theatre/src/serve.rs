// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `theatre serve` command implementation.
//!
//! Starts the SSE gateway. Each client connection gets its own conversation;
//! the process runs until SIGINT or SIGTERM.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use theatre_config::TheatreConfig;
use theatre_core::TheatreError;
use theatre_core::traits::PluginAdapter;
use theatre_core::types::HealthStatus;
use theatre_gateway::{GatewayState, ServerConfig, start_server};

use crate::adapters::Adapters;

pub async fn run_serve(config: &TheatreConfig, shutdown: CancellationToken) -> Result<(), TheatreError> {
    let adapters = Adapters::from_config(config)?;

    // An unreachable model server is not fatal: it may come up later.
    match adapters.provider.health_check().await {
        Ok(HealthStatus::Healthy) => info!(base_url = %config.provider.base_url, "completion server reachable"),
        Ok(status) => warn!(?status, base_url = %config.provider.base_url, "completion server not healthy"),
        Err(e) => warn!(error = %e, "completion server health check failed"),
    }

    let state = GatewayState::new(config, adapters.session_factory(config), shutdown);
    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        max_sessions = config.agent.max_sessions,
        "starting gateway"
    );
    start_server(&ServerConfig::from(&config.gateway), state).await
}
