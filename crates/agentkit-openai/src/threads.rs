// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant thread/run reply strategy.
//!
//! Each chat gets one remote thread, created on first use and cached for the
//! life of the strategy. A reply is produced by appending the user message,
//! starting a run, and polling it until it reaches a terminal state. The
//! remote thread keeps the history, so the local history slice is unused.

use std::time::Duration;

use agentkit_core::{
    AdapterType, AgentKitError, ChatMessage, ConversationContext, HealthStatus, PluginAdapter,
    ReplyStrategy,
};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::client::{Api, OpenAiClient};
use crate::types::{
    Assistant, CreateMessageRequest, CreateRunRequest, MessageList, Run, RunStatus, Thread,
};

/// Thread key used when a call carries no conversation context.
const ANONYMOUS_CHAT: &str = "anonymous";

/// Reply strategy backed by an OpenAI assistant.
pub struct AssistantStrategy {
    client: OpenAiClient,
    assistant_id: String,
    threads: DashMap<String, String>,
    poll_interval: Duration,
    run_timeout: Duration,
}

impl AssistantStrategy {
    pub fn new(
        client: OpenAiClient,
        assistant_id: impl Into<String>,
        poll_interval: Duration,
        run_timeout: Duration,
    ) -> Self {
        Self {
            client,
            assistant_id: assistant_id.into(),
            threads: DashMap::new(),
            poll_interval,
            run_timeout,
        }
    }

    /// Cached thread id for `chat_id`, if one was created.
    pub fn thread_for(&self, chat_id: &str) -> Option<String> {
        self.threads.get(chat_id).map(|t| t.value().clone())
    }

    async fn ensure_thread(&self, chat_id: &str) -> Result<String, AgentKitError> {
        if let Some(id) = self.thread_for(chat_id) {
            return Ok(id);
        }
        let thread: Thread = self
            .client
            .post_json("threads", Api::Assistants, &serde_json::json!({}))
            .await?;
        info!(chat_id, thread_id = %thread.id, "created assistant thread");
        // A concurrent caller may have won the race; keep whichever landed first.
        let id = self
            .threads
            .entry(chat_id.to_string())
            .or_insert(thread.id)
            .value()
            .clone();
        Ok(id)
    }

    async fn wait_for_run(&self, thread_id: &str, run: Run) -> Result<Run, AgentKitError> {
        let path = format!("threads/{thread_id}/runs/{}", run.id);
        let poll = async {
            let mut current = run;
            while current.status.is_pending() {
                tokio::time::sleep(self.poll_interval).await;
                current = self.client.get_json(&path, Api::Assistants).await?;
                debug!(run_id = %current.id, status = current.status.as_str(), "polled run");
            }
            Ok::<Run, AgentKitError>(current)
        };

        tokio::time::timeout(self.run_timeout, poll)
            .await
            .map_err(|_| AgentKitError::Timeout {
                duration: self.run_timeout,
            })?
    }

    async fn latest_assistant_text(&self, thread_id: &str) -> Result<String, AgentKitError> {
        let path = format!("threads/{thread_id}/messages?order=desc&limit=20");
        let list: MessageList = self.client.get_json(&path, Api::Assistants).await?;
        list.data
            .iter()
            .find(|m| m.role == "assistant")
            .map(|m| m.text())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AgentKitError::provider("run completed without an assistant message"))
    }
}

/// Appends the contact annotation the assistant sees inline.
pub fn annotate(input: &str, context: Option<&ConversationContext>) -> String {
    match context {
        Some(ctx) => format!(
            "{input}\n\n[Contato: {} | Plataforma: {}]",
            ctx.contact_name, ctx.platform
        ),
        None => input.to_string(),
    }
}

#[async_trait]
impl PluginAdapter for AssistantStrategy {
    fn name(&self) -> &str {
        "assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        let path = format!("assistants/{}", self.assistant_id);
        match self.client.get_json::<Assistant>(&path, Api::Assistants).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        self.threads.clear();
        Ok(())
    }
}

#[async_trait]
impl ReplyStrategy for AssistantStrategy {
    async fn produce_reply(
        &self,
        input: &str,
        context: Option<&ConversationContext>,
        _history: &[ChatMessage],
    ) -> Result<String, AgentKitError> {
        let chat_id = context.map_or(ANONYMOUS_CHAT, |c| c.chat_id.as_str());
        let thread_id = self.ensure_thread(chat_id).await?;

        let message = CreateMessageRequest {
            role: "user",
            content: annotate(input, context),
        };
        let _: serde_json::Value = self
            .client
            .post_json(&format!("threads/{thread_id}/messages"), Api::Assistants, &message)
            .await?;

        let run: Run = self
            .client
            .post_json(
                &format!("threads/{thread_id}/runs"),
                Api::Assistants,
                &CreateRunRequest {
                    assistant_id: self.assistant_id.clone(),
                },
            )
            .await?;
        debug!(chat_id, run_id = %run.id, "started assistant run");

        let run = self.wait_for_run(&thread_id, run).await?;
        if run.status != RunStatus::Completed {
            let message = run
                .last_error
                .and_then(|e| e.message.or(e.code))
                .unwrap_or_else(|| "no error details".to_string());
            warn!(chat_id, status = run.status.as_str(), error = %message, "assistant run failed");
            return Err(AgentKitError::RunFailed {
                status: run.status.as_str().to_string(),
                message,
            });
        }

        self.latest_assistant_text(&thread_id).await
    }

    async fn clear_session(&self, chat_id: &str) {
        if self.threads.remove(chat_id).is_some() {
            debug!(chat_id, "dropped cached assistant thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(base_url: &str) -> AssistantStrategy {
        let client = OpenAiClient::new("sk-test", base_url, Duration::from_secs(5)).unwrap();
        AssistantStrategy::new(
            client,
            "asst_1",
            Duration::from_millis(10),
            Duration::from_secs(2),
        )
    }

    fn ctx(chat_id: &str) -> ConversationContext {
        ConversationContext {
            chat_id: chat_id.into(),
            contact_name: "Ana".into(),
            timestamp: "2026-03-01T12:00:00+00:00".into(),
            platform: "whatsapp".into(),
            message_type: "conversation".into(),
            is_group: false,
        }
    }

    async fn mount_thread_setup(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_1"})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_u"})))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_partial_json(serde_json::json!({"assistant_id": "asst_1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "run_1", "status": "queued"})),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn annotation_carries_contact_and_platform() {
        let text = annotate("Oi", Some(&ctx("c1")));
        assert_eq!(text, "Oi\n\n[Contato: Ana | Plataforma: whatsapp]");
        assert_eq!(annotate("Oi", None), "Oi");
    }

    #[tokio::test]
    async fn completed_run_returns_latest_assistant_message() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "run_1", "status": "in_progress"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "run_1", "status": "completed"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"role": "assistant", "content": [{"type": "text", "text": {"value": "Olá, Ana!"}}]},
                    {"role": "user", "content": [{"type": "text", "text": {"value": "Oi"}}]}
                ]
            })))
            .mount(&server)
            .await;

        let s = strategy(&server.uri());
        let reply = s.produce_reply("Oi", Some(&ctx("c1")), &[]).await.unwrap();
        assert_eq!(reply, "Olá, Ana!");
        assert_eq!(s.thread_for("c1").as_deref(), Some("thread_1"));
    }

    #[tokio::test]
    async fn failed_run_carries_last_error() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "run_1",
                "status": "failed",
                "last_error": {"code": "rate_limit_exceeded", "message": "quota exceeded"}
            })))
            .mount(&server)
            .await;

        let err = strategy(&server.uri())
            .produce_reply("Oi", Some(&ctx("c1")), &[])
            .await
            .unwrap_err();
        match err {
            AgentKitError::RunFailed { status, message } => {
                assert_eq!(status, "failed");
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stuck_run_times_out() {
        let server = MockServer::start().await;
        mount_thread_setup(&server).await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "run_1", "status": "in_progress"})))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", &server.uri(), Duration::from_secs(5)).unwrap();
        let s = AssistantStrategy::new(client, "asst_1", Duration::from_millis(10), Duration::from_millis(100));
        let err = s.produce_reply("Oi", Some(&ctx("c1")), &[]).await.unwrap_err();
        assert!(matches!(err, AgentKitError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn thread_is_reused_then_dropped_on_clear() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_1"})))
            .expect(2)
            .mount(&server)
            .await;

        let s = strategy(&server.uri());
        assert_eq!(s.ensure_thread("c1").await.unwrap(), "thread_1");
        assert_eq!(s.ensure_thread("c1").await.unwrap(), "thread_1");

        s.clear_session("c1").await;
        assert!(s.thread_for("c1").is_none());
        s.ensure_thread("c1").await.unwrap();
    }

    #[tokio::test]
    async fn clear_session_leaves_other_chats() {
        let server = MockServer::start().await;
        let s = strategy(&server.uri());
        s.threads.insert("c1".into(), "thread_1".into());
        s.threads.insert("c2".into(), "thread_2".into());

        s.clear_session("c1").await;
        assert!(s.thread_for("c1").is_none());
        assert_eq!(s.thread_for("c2").as_deref(), Some("thread_2"));
    }
}
