// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `agentkit config check`: print the effective settings after validation.

use agentkit_config::{value_or_env, AgentKitConfig, Backend};
use colored::Colorize;

pub fn run_check(config: &AgentKitConfig) {
    println!("{}", "✓ configuration is valid".green());
    for (key, value) in summary(config) {
        println!("  {:<22} {value}", key.dimmed());
    }
}

/// Effective settings as `(key, value)` rows. Secrets are reported as set/unset only.
fn summary(config: &AgentKitConfig) -> Vec<(&'static str, String)> {
    let openai = &config.openai;
    let mut rows = vec![
        ("agent.name", config.agent.name.clone()),
        ("agent.history_limit", config.agent.history_limit.to_string()),
        ("openai.backend", format!("{:?}", openai.backend).to_lowercase()),
        ("openai.model", openai.model.clone()),
        ("openai.api_key", set_or_unset(value_or_env(&openai.api_key, "OPENAI_API_KEY"))),
    ];

    match openai.backend {
        Backend::Workflow => rows.push((
            "openai.workflow_id",
            value_or_env(&openai.workflow_id, "WORKFLOW_ID").unwrap_or_default(),
        )),
        Backend::Assistants => rows.push((
            "openai.assistant_id",
            openai.assistant_id.clone().unwrap_or_default(),
        )),
        Backend::Completions => {}
    }

    let supabase_enabled = value_or_env(&config.supabase.url, "SUPABASE_URL").is_some()
        && value_or_env(&config.supabase.anon_key, "SUPABASE_ANON_KEY").is_some();

    rows.extend([
        ("whatsapp.api_url", config.whatsapp.api_url.clone()),
        ("whatsapp.instance_name", config.whatsapp.instance_name.clone()),
        (
            "whatsapp.webhook",
            format!("{}:{}", config.whatsapp.webhook_host, config.whatsapp.webhook_port),
        ),
        (
            "supabase",
            if supabase_enabled { "enabled" } else { "disabled" }.to_string(),
        ),
    ]);
    rows
}

fn set_or_unset(value: Option<String>) -> String {
    match value {
        Some(_) => "set".to_string(),
        None => "unset".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_hides_api_key_and_shows_workflow_id() {
        let config = agentkit_config::load_and_validate_str(
            "[openai]\napi_key = \"sk-secret\"\nbackend = \"workflow\"\nworkflow_id = \"wf_1\"\n",
        )
        .unwrap();

        let rows = summary(&config);
        let get = |key: &str| rows.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());

        assert_eq!(get("openai.api_key").as_deref(), Some("set"));
        assert_eq!(get("openai.backend").as_deref(), Some("workflow"));
        assert_eq!(get("openai.workflow_id").as_deref(), Some("wf_1"));
        assert_eq!(get("whatsapp.webhook").as_deref(), Some("127.0.0.1:8086"));
        assert!(rows.iter().all(|(_, v)| !v.contains("sk-secret")));
    }
}
