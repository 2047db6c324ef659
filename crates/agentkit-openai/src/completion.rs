// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct chat-completion reply strategy.

use async_trait::async_trait;
use agentkit_core::{
    AdapterType, AgentKitError, ChatMessage, ConversationContext, HealthStatus, PluginAdapter,
    ReplyStrategy,
};
use tracing::debug;

use crate::client::{Api, OpenAiClient};
use crate::prompt;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

const CONNECTION_PROBE: &str = "Teste de conexão";

/// Which system prompt a [`CompletionStrategy`] sends.
#[derive(Debug, Clone)]
enum PromptStyle {
    /// Context-rich prompt with configurable instructions.
    Full { agent_name: String, instructions: String },
    /// Fixed short prompt.
    Minimal(String),
}

/// Sends `system + history + user` to `/chat/completions` and returns the
/// first choice verbatim.
#[derive(Debug, Clone)]
pub struct CompletionStrategy {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
    style: PromptStyle,
}

impl CompletionStrategy {
    /// Strategy using the full, context-aware system prompt.
    pub fn new(
        client: OpenAiClient,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        agent_name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            max_tokens,
            style: PromptStyle::Full {
                agent_name: agent_name.into(),
                instructions: instructions.into(),
            },
        }
    }

    /// Last-resort strategy with a short system prompt.
    pub fn minimal(
        client: OpenAiClient,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        agent_name: &str,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            max_tokens,
            style: PromptStyle::Minimal(prompt::minimal_system_prompt(agent_name)),
        }
    }

    fn system_prompt(&self, context: Option<&ConversationContext>) -> String {
        match &self.style {
            PromptStyle::Full {
                agent_name,
                instructions,
            } => prompt::build_system_prompt(agent_name, instructions, context),
            PromptStyle::Minimal(text) => text.clone(),
        }
    }

    /// Assembles the message list sent to the provider.
    pub fn build_messages(
        &self,
        input: &str,
        context: Option<&ConversationContext>,
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(context)));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(input));
        messages
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, AgentKitError> {
        let response: ChatCompletionResponse = self
            .client
            .post_json("chat/completions", Api::Standard, request)
            .await?;
        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AgentKitError::provider("completion returned no choices"))
    }
}

#[async_trait]
impl PluginAdapter for CompletionStrategy {
    fn name(&self) -> &str {
        match self.style {
            PromptStyle::Full { .. } => "completion",
            PromptStyle::Minimal(_) => "completion-minimal",
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(CONNECTION_PROBE)],
            temperature: None,
            max_tokens: 10,
        };
        match self.complete(&request).await {
            Ok(text) if !text.is_empty() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Degraded("empty probe reply".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyStrategy for CompletionStrategy {
    async fn produce_reply(
        &self,
        input: &str,
        context: Option<&ConversationContext>,
        history: &[ChatMessage],
    ) -> Result<String, AgentKitError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: self.build_messages(input, context, history),
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        };
        debug!(
            strategy = self.name(),
            messages = request.messages.len(),
            "requesting chat completion"
        );
        self.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use agentkit_core::Role;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(base_url: &str) -> CompletionStrategy {
        let client = OpenAiClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap();
        CompletionStrategy::new(client, "gpt-4o", 0.7, 500, "Bot", prompt::DEFAULT_INSTRUCTIONS)
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
        })
    }

    #[test]
    fn messages_are_system_history_then_user() {
        let s = strategy("http://localhost");
        let history = vec![ChatMessage::user("oi"), ChatMessage::assistant("olá")];
        let messages = s.build_messages("tudo bem?", None, &history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "oi");
        assert_eq!(messages[3], ChatMessage::user("tudo bem?"));
    }

    #[tokio::test]
    async fn produce_reply_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Olá, Ana!")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = strategy(&server.uri()).produce_reply("Oi", None, &[]).await.unwrap();
        assert_eq!(reply, "Olá, Ana!");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = strategy(&server.uri()).produce_reply("Oi", None, &[]).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn health_check_probes_with_small_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 10,
                "messages": [{"role": "user", "content": "Teste de conexão"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let status = strategy(&server.uri()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_reports_unhealthy_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "Incorrect API key"}
            })))
            .mount(&server)
            .await;

        let status = strategy(&server.uri()).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(msg) if msg.contains("Incorrect API key")));
    }

    #[test]
    fn minimal_variant_is_named_separately() {
        let client = OpenAiClient::new("k", "http://localhost", Duration::from_secs(1)).unwrap();
        let s = CompletionStrategy::minimal(client, "gpt-4o", 0.7, 500, "Bot");
        assert_eq!(s.name(), "completion-minimal");
        let messages = s.build_messages("oi", None, &[]);
        assert!(messages[0].content.contains("português brasileiro"));
    }
}
