// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted workflow reply strategy (`/chatkit/workflows/{id}/runs`).

use agentkit_core::{
    AdapterType, AgentKitError, ChatMessage, ConversationContext, HealthStatus, PluginAdapter,
    ReplyStrategy,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::{Api, OpenAiClient};
use crate::types::{WorkflowInput, WorkflowRunRequest, WorkflowUser};

/// Platform label the workflow receives for every user.
const WORKFLOW_PLATFORM: &str = "WhatsApp";

/// Output fields checked, in order, for the reply text.
const OUTPUT_FIELDS: [&str; 4] = ["output", "result", "message", "text"];

/// Health detail for a strategy that cannot check the provider.
pub const NO_CONNECTION_CHECK: &str = "workflow runs have no connection check";

/// Reply strategy that runs a hosted workflow with the user's message.
pub struct WorkflowStrategy {
    client: OpenAiClient,
    workflow_id: String,
}

impl WorkflowStrategy {
    pub fn new(client: OpenAiClient, workflow_id: impl Into<String>) -> Self {
        Self {
            client,
            workflow_id: workflow_id.into(),
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }
}

/// Builds the run request for `input` from the chat's context.
pub fn build_request(input: &str, context: Option<&ConversationContext>) -> WorkflowRunRequest {
    let chat_id = context.map(|c| c.chat_id.clone()).unwrap_or_default();
    let name = context
        .map(|c| c.contact_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| chat_id.clone());
    WorkflowRunRequest {
        input: WorkflowInput {
            message: input.to_string(),
            user: WorkflowUser {
                name,
                platform: WORKFLOW_PLATFORM.to_string(),
                chat_id,
            },
        },
    }
}

/// Picks the reply text out of a workflow result.
pub fn extract_reply(payload: &Value) -> String {
    OUTPUT_FIELDS
        .iter()
        .find_map(|field| payload.get(field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}

#[async_trait]
impl PluginAdapter for WorkflowStrategy {
    fn name(&self) -> &str {
        "workflow"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    /// The runs endpoint has no side-effect-free request to test with.
    /// Reporting degraded lets the completion health checks later in the
    /// chain decide reachability.
    async fn health_check(&self) -> Result<HealthStatus, AgentKitError> {
        Ok(HealthStatus::Degraded(NO_CONNECTION_CHECK.into()))
    }

    async fn shutdown(&self) -> Result<(), AgentKitError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyStrategy for WorkflowStrategy {
    async fn produce_reply(
        &self,
        input: &str,
        context: Option<&ConversationContext>,
        _history: &[ChatMessage],
    ) -> Result<String, AgentKitError> {
        let path = format!("chatkit/workflows/{}/runs", self.workflow_id);
        let request = build_request(input, context);
        debug!(workflow_id = %self.workflow_id, "running hosted workflow");

        let (status, body) = self.client.post_raw(&path, Api::Standard, &request).await?;
        if !status.is_success() {
            let details = serde_json::from_str::<Value>(&body)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| Value::String(body.clone()).to_string());
            return Err(AgentKitError::provider(format!(
                "ChatKit workflow error ({}): {details}",
                status.as_u16()
            )));
        }

        let payload: Value = serde_json::from_str(&body).map_err(|e| AgentKitError::Provider {
            message: "Invalid JSON from ChatKit workflow".into(),
            source: Some(Box::new(e)),
        })?;
        Ok(extract_reply(&payload))
    }
}
