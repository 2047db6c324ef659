// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI reply strategies for the AgentKit WhatsApp relay.
//!
//! This crate implements [`ReplyStrategy`] three ways (direct chat
//! completion, assistant thread runs, hosted workflow runs) and builds the
//! ordered fallback chain selected by `openai.backend`.

pub mod assistants;
pub mod client;
pub mod completion;
pub mod prompt;
pub mod threads;
pub mod types;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;

use agentkit_config::{value_or_env, AgentKitConfig, Backend};
use agentkit_core::{AgentKitError, ReplyStrategy};
use tracing::info;

pub use client::OpenAiClient;
pub use completion::CompletionStrategy;
pub use threads::AssistantStrategy;
pub use workflow::WorkflowStrategy;

/// Resolves the API key: `openai.api_key` -> `OPENAI_API_KEY` -> error.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, AgentKitError> {
    value_or_env(config_key, "OPENAI_API_KEY").ok_or_else(|| {
        AgentKitError::Config(
            "OpenAI API key not found. Set openai.api_key in config or OPENAI_API_KEY environment variable.".into(),
        )
    })
}

/// Builds a client from the `[openai]` section.
pub fn client_from_config(config: &AgentKitConfig) -> Result<OpenAiClient, AgentKitError> {
    let api_key = resolve_api_key(&config.openai.api_key)?;
    OpenAiClient::new(
        &api_key,
        &config.openai.base_url,
        Duration::from_secs(config.openai.request_timeout_secs),
    )
}

/// Builds the ordered strategy chain for the configured backend.
///
/// | backend | chain |
/// |---|---|
/// | `workflow` | workflow, completion, minimal completion |
/// | `completions` | completion, minimal completion |
/// | `assistants` | assistant |
pub async fn build_strategies(
    config: &AgentKitConfig,
) -> Result<Vec<Arc<dyn ReplyStrategy>>, AgentKitError> {
    let client = client_from_config(config)?;
    let openai = &config.openai;
    let mut chain: Vec<Arc<dyn ReplyStrategy>> = Vec::new();

    let completions = |chain: &mut Vec<Arc<dyn ReplyStrategy>>, instructions: String| {
        chain.push(Arc::new(CompletionStrategy::new(
            client.clone(),
            openai.model.clone(),
            openai.temperature,
            openai.max_tokens,
            config.agent.name.clone(),
            instructions,
        )));
        chain.push(Arc::new(CompletionStrategy::minimal(
            client.clone(),
            openai.model.clone(),
            openai.temperature,
            openai.max_tokens,
            &config.agent.name,
        )));
    };

    match openai.backend {
        Backend::Workflow => {
            let workflow_id = value_or_env(&openai.workflow_id, "WORKFLOW_ID").ok_or_else(|| {
                AgentKitError::Config(
                    "workflow backend requires openai.workflow_id or WORKFLOW_ID".into(),
                )
            })?;
            chain.push(Arc::new(WorkflowStrategy::new(client.clone(), workflow_id)));
            let instructions = load_instructions(config).await;
            completions(&mut chain, instructions);
        }
        Backend::Completions => {
            let instructions = load_instructions(config).await;
            completions(&mut chain, instructions);
        }
        Backend::Assistants => {
            let assistant_id = openai
                .assistant_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| {
                    AgentKitError::Config("assistants backend requires openai.assistant_id".into())
                })?;
            chain.push(Arc::new(AssistantStrategy::new(
                client.clone(),
                assistant_id,
                Duration::from_millis(openai.poll_interval_ms),
                Duration::from_secs(openai.run_timeout_secs),
            )));
        }
    }

    info!(
        backend = ?openai.backend,
        strategies = ?chain.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
        "reply strategies initialized"
    );
    Ok(chain)
}

async fn load_instructions(config: &AgentKitConfig) -> String {
    prompt::load_instructions(&config.agent.system_prompt, &config.agent.system_prompt_file).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(backend: Backend) -> AgentKitConfig {
        let mut config = AgentKitConfig::default();
        config.openai.api_key = Some("sk-test".into());
        config.openai.backend = backend;
        config
    }

    fn names(chain: &[Arc<dyn ReplyStrategy>]) -> Vec<&str> {
        chain.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("sk-test-123".into())).unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OPENAI_API_KEY", "sk-from-env");
            assert_eq!(resolve_api_key(&None).unwrap(), "sk-from-env");
            assert_eq!(resolve_api_key(&Some("  ".into())).unwrap(), "sk-from-env");

            jail.set_env("OPENAI_API_KEY", "");
            let err = resolve_api_key(&None).unwrap_err();
            assert!(err.to_string().contains("API key not found"), "got: {err}");
            Ok(())
        });
    }

    #[tokio::test]
    async fn completions_chain_has_minimal_fallback() {
        let chain = build_strategies(&config_with(Backend::Completions)).await.unwrap();
        assert_eq!(names(&chain), ["completion", "completion-minimal"]);
    }

    #[tokio::test]
    async fn workflow_chain_falls_back_to_completions() {
        let mut config = config_with(Backend::Workflow);
        config.openai.workflow_id = Some("wf_123".into());
        let chain = build_strategies(&config).await.unwrap();
        assert_eq!(names(&chain), ["workflow", "completion", "completion-minimal"]);
    }

    #[tokio::test]
    async fn assistants_chain_is_single_strategy() {
        let mut config = config_with(Backend::Assistants);
        config.openai.assistant_id = Some("asst_1".into());
        let chain = build_strategies(&config).await.unwrap();
        assert_eq!(names(&chain), ["assistant"]);
    }

    #[tokio::test]
    async fn assistants_without_id_is_config_error() {
        let result = build_strategies(&config_with(Backend::Assistants)).await;
        assert!(matches!(result, Err(AgentKitError::Config(_))));
    }
}
