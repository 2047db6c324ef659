// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply strategy trait for the different ways of reaching the AI provider.

use async_trait::async_trait;

use crate::error::AgentKitError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatMessage, ConversationContext};

/// One way of turning user input into a reply (direct completion,
/// assistant thread run, hosted workflow).
///
/// Strategies never retry on their own; recovery is the caller's job.
#[async_trait]
pub trait ReplyStrategy: PluginAdapter {
    /// Produces the reply text for `input`, given the chat's context and prior turns.
    ///
    /// `history` holds the turns *before* `input`; implementations append
    /// `input` themselves.
    async fn produce_reply(
        &self,
        input: &str,
        context: Option<&ConversationContext>,
        history: &[ChatMessage],
    ) -> Result<String, AgentKitError>;

    /// Forgets any remote or cached state held for `chat_id`.
    async fn clear_session(&self, _chat_id: &str) {}
}
