// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express, such
//! as numeric ranges and backend-specific required identifiers.

use crate::diagnostic::ConfigError;
use crate::model::{value_or_env, AgentKitConfig, Backend};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing fast.
pub fn validate_config(config: &AgentKitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.history_limit == 0 {
        errors.push(ConfigError::validation(
            "agent.history_limit must be at least 1",
        ));
    }

    let temperature = config.openai.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(ConfigError::validation(format!(
            "openai.temperature must be between 0.0 and 2.0, got {temperature}"
        )));
    }

    if config.openai.max_tokens == 0 {
        errors.push(ConfigError::validation("openai.max_tokens must be at least 1"));
    }

    if config.openai.poll_interval_ms == 0 {
        errors.push(ConfigError::validation(
            "openai.poll_interval_ms must be at least 1",
        ));
    }

    if config.openai.run_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "openai.run_timeout_secs must be at least 1",
        ));
    }

    match config.openai.backend {
        Backend::Workflow => {
            if value_or_env(&config.openai.workflow_id, "WORKFLOW_ID").is_none() {
                errors.push(ConfigError::validation(
                    "openai.workflow_id (or WORKFLOW_ID) is required when backend = \"workflow\"",
                ));
            }
        }
        Backend::Assistants => {
            let missing = config
                .openai
                .assistant_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty());
            if missing {
                errors.push(ConfigError::validation(
                    "openai.assistant_id is required when backend = \"assistants\"",
                ));
            }
        }
        Backend::Completions => {}
    }

    if config.whatsapp.webhook_host.trim().is_empty() {
        errors.push(ConfigError::validation(
            "whatsapp.webhook_host must not be empty",
        ));
    }

    if config.whatsapp.instance_name.trim().is_empty() {
        errors.push(ConfigError::validation(
            "whatsapp.instance_name must not be empty",
        ));
    }

    // Only the config-file halves are checked; env fallbacks are resolved at startup.
    let has_url = config.supabase.url.as_deref().is_some_and(|v| !v.trim().is_empty());
    let has_key = config
        .supabase
        .anon_key
        .as_deref()
        .is_some_and(|v| !v.trim().is_empty());
    if has_url != has_key {
        errors.push(ConfigError::validation(
            "supabase.url and supabase.anon_key must be set together",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
