// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain HTTP handlers: the about page and the health probe.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::server::GatewayState;

/// Static page served at `/about`.
pub const ABOUT_PAGE: &str = r#"<html>
    <head>
        <title>theatre</title>
    </head>
    <body>
        <h1 style="text-align:center;font-family:Arial">theatre</h1>
    </body>
</html>
"#;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Conversations currently streaming.
    pub active_sessions: usize,
    pub max_sessions: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

impl ErrorResponse {
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// GET /about
pub async fn get_about() -> Html<&'static str> {
    Html(ABOUT_PAGE)
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        active_sessions: state.active_sessions(),
        max_sessions: state.max_sessions,
    })
}
