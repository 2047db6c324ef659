// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use agentkit_core::types::PLATFORM_WHATSAPP;
use agentkit_core::ConversationContext;

/// Builds the context record passed to the reply strategies, stamped with
/// the current UTC time.
pub fn build(
    chat_id: &str,
    contact_name: &str,
    message_type: &str,
    is_group: bool,
) -> ConversationContext {
    ConversationContext {
        chat_id: chat_id.to_string(),
        contact_name: contact_name.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        platform: PLATFORM_WHATSAPP.to_string(),
        message_type: message_type.to_string(),
        is_group,
    }
}
