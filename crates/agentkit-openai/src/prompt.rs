// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt construction.
//!
//! The full prompt embeds the conversation context (contact, platform,
//! message type, group flag, timestamp) and a JSON dump of it. The minimal
//! prompt is used by the last-resort fallback strategy.

use agentkit_core::ConversationContext;
use tracing::{info, warn};

/// Behavioral instructions used when neither a prompt file nor an inline prompt is configured.
pub const DEFAULT_INSTRUCTIONS: &str = "\
- Seja amigável e prestativo
- Mantenha respostas concisas (máximo 500 caracteres para WhatsApp)
- Use emojis ocasionalmente para tornar a conversa mais amigável
- Se for uma pergunta sobre AgentKit, responda com informações relevantes
- Se não souber algo, seja honesto e ofereça ajuda de outra forma
- Responda sempre em português brasileiro";

/// Instructions given to assistants created through the CLI.
pub const ASSISTANT_INSTRUCTIONS: &str = "\
Você é um assistente inteligente do AgentKit para WhatsApp.

Instruções:
- Seja amigável e prestativo
- Mantenha respostas concisas (máximo 500 caracteres para WhatsApp)
- Use emojis ocasionalmente
- Responda sempre em português brasileiro
- Se não souber algo, seja honesto
- Se precisar buscar informações atualizadas, use web search";

/// Loads the behavioral instructions following priority: file > inline > default.
pub async fn load_instructions(inline: &Option<String>, file: &Option<String>) -> String {
    if let Some(path) = file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = path, "loaded system prompt from file");
                    return trimmed.to_string();
                }
            }
            Err(e) => {
                warn!(path = path, error = %e, "failed to read system prompt file, falling back");
            }
        }
    }

    if let Some(prompt) = inline
        && !prompt.trim().is_empty()
    {
        return prompt.clone();
    }

    DEFAULT_INSTRUCTIONS.to_string()
}

/// Builds the full system prompt for `agent_name` with `instructions` and the chat's context.
pub fn build_system_prompt(
    agent_name: &str,
    instructions: &str,
    context: Option<&ConversationContext>,
) -> String {
    let contact = context.map_or("Usuário", |c| c.contact_name.as_str());
    let platform = context.map_or("whatsapp", |c| c.platform.as_str());
    let message_type = context.map_or("text", |c| c.message_type.as_str());
    let is_group = if context.is_some_and(|c| c.is_group) {
        "Sim"
    } else {
        "Não"
    };
    let timestamp = context
        .map(|c| c.timestamp.clone())
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
    let extra = context
        .and_then(|c| serde_json::to_string(c).ok())
        .unwrap_or_else(|| "{}".to_string());

    format!(
        "Você é {agent_name}, um assistente útil do AgentKit.\n\
         \n\
         Contexto da conversa:\n\
         - Contato: {contact}\n\
         - Plataforma: {platform}\n\
         - Tipo de mensagem: {message_type}\n\
         - É grupo: {is_group}\n\
         - Timestamp: {timestamp}\n\
         \n\
         Instruções:\n\
         {instructions}\n\
         \n\
         Contexto adicional: {extra}"
    )
}

/// Short prompt for the last-resort completion.
pub fn minimal_system_prompt(agent_name: &str) -> String {
    format!(
        "Você é {agent_name}, um assistente do AgentKit no WhatsApp. \
         Responda de forma breve e amigável, sempre em português brasileiro."
    )
}
