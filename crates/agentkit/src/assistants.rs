// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `agentkit assistants` admin commands.
//!
//! Failures are printed as a single human-readable line; the process still
//! exits successfully.

use agentkit_config::AgentKitConfig;
use agentkit_core::AgentKitError;
use agentkit_openai::assistants::{create_assistant, default_assistant_request, list_assistants};
use agentkit_openai::types::Assistant;
use colored::Colorize;

pub async fn run_create(config: &AgentKitConfig) {
    match create(config).await {
        Ok(assistant) => {
            println!("\n{}\n", "✅ Assistant criado com sucesso!".green().bold());
            print!("{}", format_created(&assistant));
        }
        Err(e) => print_error(&e),
    }
}

pub async fn run_list(config: &AgentKitConfig, limit: u32) {
    match list(config, limit).await {
        Ok(assistants) => {
            println!("\n{}\n", "📋 Assistants disponíveis:".bold());
            print!("{}", format_list(&assistants));
        }
        Err(e) => print_error(&e),
    }
}

async fn create(config: &AgentKitConfig) -> Result<Assistant, AgentKitError> {
    let client = agentkit_openai::client_from_config(config)?;
    let request = default_assistant_request(&config.agent.name, &config.openai.model);
    create_assistant(&client, &request).await
}

async fn list(config: &AgentKitConfig, limit: u32) -> Result<Vec<Assistant>, AgentKitError> {
    let client = agentkit_openai::client_from_config(config)?;
    list_assistants(&client, limit).await
}

fn print_error(error: &AgentKitError) {
    eprintln!("{} {error}", "❌ Erro:".red());
}

fn format_created(assistant: &Assistant) -> String {
    format!(
        "ID: {}\nNome: {}\nModelo: {}\n\n💡 Copie este ID para o arquivo .env:\n\nWORKFLOW_ID={}\n\n",
        assistant.id,
        assistant.name.as_deref().unwrap_or("Sem nome"),
        assistant.model,
        assistant.id,
    )
}

fn format_list(assistants: &[Assistant]) -> String {
    if assistants.is_empty() {
        return "❌ Nenhum assistant encontrado.\n\n💡 Crie um em: https://platform.openai.com/assistants\n\n"
            .to_string();
    }

    let mut out = String::new();
    for assistant in assistants {
        let tools: Vec<&str> = assistant.tools.iter().map(|t| t.kind.as_str()).collect();
        let tools = if tools.is_empty() {
            "Nenhuma".to_string()
        } else {
            tools.join(", ")
        };
        out.push_str(&format!(
            "✅ ID: {}\n   Nome: {}\n   Modelo: {}\n   Tools: {}\n\n",
            assistant.id,
            assistant.name.as_deref().unwrap_or("Sem nome"),
            assistant.model,
            tools,
        ));
    }
    out
}
