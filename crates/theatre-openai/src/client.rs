// SPDX-FileCopyrightText: 2026 Theatre Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible completion and embedding endpoints.
//!
//! Provides [`OpenAiClient`] which handles request construction, bearer
//! authentication and error mapping. Requests are never retried: a failed
//! call ends the conversation that made it.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use theatre_core::{ExternalService, TheatreError};

use crate::types::{
    ApiErrorResponse, CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse,
};

/// HTTP client for an OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (up to and including `/v1`).
    ///
    /// `api_key` is sent as a bearer token when present; local servers
    /// usually need none.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, TheatreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| TheatreError::Config(format!("invalid API key header value: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TheatreError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs to `/completions`.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, TheatreError> {
        self.post_json("/completions", request, ExternalService::Completion)
            .await
    }

    /// POSTs to `/embeddings`.
    pub async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, TheatreError> {
        self.post_json("/embeddings", request, ExternalService::Embedding)
            .await
    }

    /// GETs `/models`; any 2xx means the server is up.
    pub async fn ping(&self) -> Result<(), TheatreError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(ExternalService::Completion, e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TheatreError::completion(format!("health probe returned {status}")))
        }
    }

    async fn post_json<Req, Resp>(
        &self,
        endpoint: &str,
        request: &Req,
        service: ExternalService,
    ) -> Result<Resp, TheatreError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(service, e))?;

        let status = response.status();
        debug!(status = %status, endpoint, "response received");

        let body = response.text().await.map_err(|e| TheatreError::ExternalService {
            service,
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => match api_err.error.type_ {
                    Some(kind) => format!("API error ({kind}): {}", api_err.error.message),
                    None => format!("API error: {}", api_err.error.message),
                },
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(TheatreError::ExternalService {
                service,
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| TheatreError::ExternalService {
            service,
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn transport_error(&self, service: ExternalService, e: reqwest::Error) -> TheatreError {
        let message = if e.is_timeout() {
            format!("request timed out after {:?}", self.timeout)
        } else {
            format!("HTTP request failed: {e}")
        };
        TheatreError::ExternalService {
            service,
            message,
            source: Some(Box::new(e)),
        }
    }
}
