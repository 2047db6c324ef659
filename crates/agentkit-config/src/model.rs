// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the AgentKit relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level AgentKit configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentKitConfig {
    /// Bot identity and conversation settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI API and backend selection.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// WhatsApp bridge settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Dashboard log store settings.
    #[serde(default)]
    pub supabase: SupabaseConfig,
}

/// Bot identity and conversation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot, used in help text and default prompts.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of turns kept per chat after trimming.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Inline behavioral instructions. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the behavioral instructions.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            history_limit: default_history_limit(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "AgentKit WhatsApp Bot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_limit() -> usize {
    20
}

/// Which remote backend produces replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Stateless chat completions with a simplified-prompt fallback.
    #[default]
    Completions,
    /// Assistants API: one persistent thread per chat, polled runs.
    Assistants,
    /// Hosted workflow run endpoint, falling back to completions.
    Workflow,
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for chat completions.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for chat completions.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens generated per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Active backend.
    #[serde(default)]
    pub backend: Backend,

    /// Hosted workflow id (`wf_...`). `None` falls back to `WORKFLOW_ID`.
    #[serde(default)]
    pub workflow_id: Option<String>,

    /// Assistant id (`asst_...`) for the assistants backend.
    #[serde(default)]
    pub assistant_id: Option<String>,

    /// Delay between run status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on how long a single run may take before the call fails.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            backend: Backend::default(),
            workflow_id: None,
            assistant_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_run_timeout_secs() -> u64 {
    120
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// WhatsApp bridge (Evolution API) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Bridge REST base URL.
    #[serde(default = "default_bridge_url")]
    pub api_url: String,

    /// Bridge API key sent in the `apikey` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bridge instance bound to the WhatsApp session.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Address the webhook receiver binds to.
    #[serde(default = "default_webhook_host")]
    pub webhook_host: String,

    /// Port the webhook receiver binds to.
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: default_bridge_url(),
            api_key: None,
            instance_name: default_instance_name(),
            webhook_host: default_webhook_host(),
            webhook_port: default_webhook_port(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8085".to_string()
}

fn default_instance_name() -> String {
    "agentkit".to_string()
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8086
}

/// Supabase (PostgREST) log store configuration.
///
/// Leaving `url` or `anon_key` unset disables logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupabaseConfig {
    /// Project URL. `None` falls back to `SUPABASE_URL`.
    #[serde(default)]
    pub url: Option<String>,

    /// Anonymous API key. `None` falls back to `SUPABASE_ANON_KEY`.
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Table receiving message records.
    #[serde(default = "default_messages_table")]
    pub messages_table: String,

    /// Table receiving bot status records.
    #[serde(default = "default_status_table")]
    pub status_table: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            messages_table: default_messages_table(),
            status_table: default_status_table(),
        }
    }
}

fn default_messages_table() -> String {
    "messages".to_string()
}

fn default_status_table() -> String {
    "bot_status".to_string()
}

/// Returns the configured value when non-empty, otherwise the named environment variable.
///
/// Shared by the adapters that accept both a config key and a conventional
/// environment variable (`OPENAI_API_KEY`, `SUPABASE_URL`, ...).
pub fn value_or_env(value: &Option<String>, env_var: &str) -> Option<String> {
    if let Some(v) = value
        && !v.trim().is_empty()
    {
        return Some(v.clone());
    }
    std::env::var(env_var).ok().filter(|v| !v.trim().is_empty())
}
