// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI REST API.
//!
//! Provides [`OpenAiClient`] which handles bearer authentication, the
//! assistants beta header, JSON encoding, and error body decoding. Requests
//! are never retried here; fallback between strategies happens upstream.

use std::time::Duration;

use agentkit_core::AgentKitError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::types::ApiErrorResponse;

const ASSISTANTS_BETA: &str = "assistants=v2";

/// Which header set a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Stable endpoints (chat completions, workflows).
    Standard,
    /// Assistants v2 endpoints (`OpenAI-Beta: assistants=v2`).
    Assistants,
}

/// HTTP client for OpenAI API communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client that authenticates with `api_key` against `base_url`.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, AgentKitError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| AgentKitError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AgentKitError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, api: Api) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match api {
            Api::Standard => builder,
            Api::Assistants => builder.header("OpenAI-Beta", ASSISTANTS_BETA),
        }
    }

    /// POSTs `body` and decodes a successful JSON response.
    pub async fn post_json<B, R>(&self, path: &str, api: Api, body: &B) -> Result<R, AgentKitError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (status, text) = self.send(self.request(Method::POST, path, api).json(body)).await?;
        decode(path, status, &text)
    }

    /// GETs `path` (which may carry a query string) and decodes the JSON response.
    pub async fn get_json<R>(&self, path: &str, api: Api) -> Result<R, AgentKitError>
    where
        R: DeserializeOwned,
    {
        let (status, text) = self.send(self.request(Method::GET, path, api)).await?;
        decode(path, status, &text)
    }

    /// POSTs `body` and returns the raw status and body without interpreting them.
    pub async fn post_raw<B>(
        &self,
        path: &str,
        api: Api,
        body: &B,
    ) -> Result<(StatusCode, String), AgentKitError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path, api).json(body)).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, String), AgentKitError> {
        let response = builder.send().await.map_err(|e| AgentKitError::Provider {
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AgentKitError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, bytes = text.len(), "OpenAI response received");
        Ok((status, text))
    }
}

fn decode<R: DeserializeOwned>(path: &str, status: StatusCode, body: &str) -> Result<R, AgentKitError> {
    if !status.is_success() {
        return Err(AgentKitError::provider(describe_error(status, body)));
    }
    serde_json::from_str(body).map_err(|e| AgentKitError::Provider {
        message: format!("failed to parse response from {path}: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Human-readable message for a non-2xx response, preferring the API's own error text.
pub fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("OpenAI API error ({kind}): {}", api_err.error.message),
            None => format!("OpenAI API error ({status}): {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    }
}
