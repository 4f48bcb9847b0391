// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Router, routing::get};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use theatre_agent::SessionFactory;
use theatre_config::TheatreConfig;
use theatre_config::model::GatewayConfig;
use theatre_core::TheatreError;

use crate::handlers;
use crate::sse::{self, StreamSettings};

/// Health state for the health endpoint.
#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Builds a fresh pair of agents per stream.
    pub factory: Arc<SessionFactory>,
    /// One permit per concurrently running conversation.
    pub sessions: Arc<Semaphore>,
    pub max_sessions: usize,
    pub stream: StreamSettings,
    /// Cancelled on shutdown; every session runs on a child token.
    pub shutdown: CancellationToken,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(config: &TheatreConfig, factory: SessionFactory, shutdown: CancellationToken) -> Self {
        let max_sessions = config.agent.max_sessions;
        Self {
            factory: Arc::new(factory),
            sessions: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
            stream: StreamSettings {
                event_delay: Duration::from_millis(config.gateway.event_delay_ms),
                retry: Duration::from_millis(config.gateway.stream_retry_ms),
            },
            shutdown,
            health: HealthState {
                start_time: Instant::now(),
            },
        }
    }

    /// Conversations currently holding a permit.
    pub fn active_sessions(&self) -> usize {
        self.max_sessions
            .saturating_sub(self.sessions.available_permits())
    }
}

/// Gateway server configuration (bind address only).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Builds the gateway router.
///
/// - GET / and GET /stream: SSE conversation stream
/// - GET /about: static page
/// - GET /health: JSON status
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(sse::stream_conversation))
        .route("/stream", get(sse::stream_conversation))
        .route("/about", get(handlers::get_about))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        // The browser viewer connects cross-origin.
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Serves until the state's shutdown token is cancelled.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), TheatreError> {
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TheatreError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| TheatreError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
