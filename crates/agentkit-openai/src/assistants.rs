// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant administration calls used by the CLI.

use agentkit_core::AgentKitError;

use crate::client::{Api, OpenAiClient};
use crate::prompt::ASSISTANT_INSTRUCTIONS;
use crate::types::{Assistant, AssistantList, CreateAssistantRequest};

/// Request for the stock WhatsApp assistant: no tools, Portuguese instructions.
pub fn default_assistant_request(name: &str, model: &str) -> CreateAssistantRequest {
    CreateAssistantRequest {
        name: name.to_string(),
        instructions: ASSISTANT_INSTRUCTIONS.to_string(),
        model: model.to_string(),
        tools: Vec::new(),
    }
}

pub async fn create_assistant(
    client: &OpenAiClient,
    request: &CreateAssistantRequest,
) -> Result<Assistant, AgentKitError> {
    client.post_json("assistants", Api::Assistants, request).await
}

/// Lists up to `limit` assistants, newest first.
pub async fn list_assistants(
    client: &OpenAiClient,
    limit: u32,
) -> Result<Vec<Assistant>, AgentKitError> {
    let path = format!("assistants?order=desc&limit={limit}");
    let list: AssistantList = client.get_json(&path, Api::Assistants).await?;
    Ok(list.data)
}
