// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-completion services.

use async_trait::async_trait;

use crate::error::TheatreError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a text-completion capability.
///
/// The core depends only on this request/response contract, never on a
/// particular model runtime. Calls may be slow and may fail; failures are
/// reported as [`TheatreError::ExternalService`].
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, TheatreError>;
}
