// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the Evolution API bridge.

use std::time::Duration;

use agentkit_core::AgentKitError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::handler;

/// Connection state reported by the bridge for the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    Open,
    Connecting,
    Closed,
    Other(String),
}

impl BridgeState {
    fn parse(state: &str) -> Self {
        match state {
            "open" | "connected" => Self::Open,
            "connecting" => Self::Connecting,
            "close" | "closed" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Thin HTTP client for one bridge instance.
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    client: reqwest::Client,
    api_url: String,
    instance: String,
}

impl EvolutionClient {
    pub fn new(
        api_url: &str,
        instance: &str,
        api_key: Option<&str>,
    ) -> Result<Self, AgentKitError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(key).map_err(|e| {
                AgentKitError::Config(format!("invalid bridge API key header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert("apikey", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgentKitError::Channel {
                message: format!("failed to build bridge HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            instance: instance.to_string(),
        })
    }

    /// Sends a text message to `number` (a JID or bare phone number).
    ///
    /// Returns the bridge-assigned message id, or a local one when the bridge
    /// does not echo it.
    pub async fn send_text(&self, number: &str, text: &str) -> Result<String, AgentKitError> {
        let url = format!("{}/message/sendText/{}", self.api_url, self.instance);
        let body = json!({ "number": number, "text": text });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentKitError::Channel {
                message: format!("sendText request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, body = %text, "bridge rejected sendText");
            return Err(AgentKitError::channel(format!(
                "sendText returned {status}: {text}"
            )));
        }

        let id = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["key"]["id"].as_str().map(str::to_string))
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        debug!(number, message_id = %id, "message sent via bridge");
        Ok(id)
    }

    /// Current connection state of the instance.
    pub async fn connection_state(&self) -> Result<BridgeState, AgentKitError> {
        let url = format!("{}/instance/connectionState/{}", self.api_url, self.instance);
        let value = self.get_json(&url).await?;
        let state = value["instance"]["state"]
            .as_str()
            .or_else(|| value["state"].as_str())
            .unwrap_or("unknown");
        Ok(BridgeState::parse(state))
    }

    /// Asks the bridge to start pairing; returns the QR code if one was issued.
    pub async fn request_qr(&self) -> Result<Option<String>, AgentKitError> {
        let url = format!("{}/instance/connect/{}", self.api_url, self.instance);
        let value = self.get_json(&url).await?;
        Ok(handler::parse_qr(&value))
    }

    async fn get_json(&self, url: &str) -> Result<Value, AgentKitError> {
        let response = self.client.get(url).send().await.map_err(|e| AgentKitError::Channel {
            message: format!("bridge request failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentKitError::channel(format!(
                "bridge returned {status}: {body}"
            )));
        }
        response.json().await.map_err(|e| AgentKitError::Channel {
            message: format!("invalid bridge response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> EvolutionClient {
        EvolutionClient::new(uri, "agentkit", Some("bridge-key")).unwrap()
    }

    #[tokio::test]
    async fn send_text_posts_number_and_text_with_apikey() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/agentkit"))
            .and(header("apikey", "bridge-key"))
            .and(body_json(json!({"number": "5511999@s.whatsapp.net", "text": "Olá, Ana!"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "key": {"remoteJid": "5511999@s.whatsapp.net", "fromMe": true, "id": "BAE5"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server.uri())
            .send_text("5511999@s.whatsapp.net", "Olá, Ana!")
            .await
            .unwrap();
        assert_eq!(id, "BAE5");
    }

    #[tokio::test]
    async fn send_text_error_status_is_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad number"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).send_text("x", "y").await.unwrap_err();
        assert!(matches!(err, AgentKitError::Channel { .. }));
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn connection_state_reads_instance_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connectionState/agentkit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instance": {"instanceName": "agentkit", "state": "open"}
            })))
            .mount(&server)
            .await;

        let state = client(&server.uri()).connection_state().await.unwrap();
        assert_eq!(state, BridgeState::Open);
    }

    #[tokio::test]
    async fn request_qr_extracts_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instance/connect/agentkit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pairingCode": null,
                "code": "2@xyz",
                "base64": "data:image/png;base64,AAAA"
            })))
            .mount(&server)
            .await;

        let qr = client(&server.uri()).request_qr().await.unwrap();
        assert_eq!(qr.as_deref(), Some("2@xyz"));
    }
}
