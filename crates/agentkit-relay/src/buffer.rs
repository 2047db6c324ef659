// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat conversation buffers and the history trimming policy.

use agentkit_core::{ChatMessage, Role};
use dashmap::DashMap;

/// Trims `history` to at most `max_len` messages.
///
/// Histories within the limit are returned unchanged. Longer ones keep the
/// first system message (if any) followed by the newest `max_len - 1` other
/// messages; without a system message the newest `max_len` are kept.
pub fn trim(history: &[ChatMessage], max_len: usize) -> Vec<ChatMessage> {
    if history.len() <= max_len {
        return history.to_vec();
    }
    if max_len == 0 {
        return Vec::new();
    }

    match history.iter().position(|m| m.role == Role::System) {
        Some(idx) => {
            let rest: Vec<&ChatMessage> = history
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, m)| m)
                .collect();
            let keep = max_len - 1;
            let mut trimmed = Vec::with_capacity(max_len);
            trimmed.push(history[idx].clone());
            trimmed.extend(rest[rest.len().saturating_sub(keep)..].iter().map(|m| (*m).clone()));
            trimmed
        }
        None => history[history.len() - max_len..].to_vec(),
    }
}

/// In-memory conversation history per chat id. Lost on restart.
#[derive(Debug, Default)]
pub struct ConversationBuffer {
    chats: DashMap<String, Vec<ChatMessage>>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `chat_id`, empty if the chat is unknown.
    pub fn get(&self, chat_id: &str) -> Vec<ChatMessage> {
        self.chats
            .get(chat_id)
            .map(|h| h.value().clone())
            .unwrap_or_default()
    }

    pub fn append(&self, chat_id: &str, message: ChatMessage) {
        self.chats.entry(chat_id.to_string()).or_default().push(message);
    }

    /// Replaces the chat's history wholesale.
    pub fn replace(&self, chat_id: &str, history: Vec<ChatMessage>) {
        self.chats.insert(chat_id.to_string(), history);
    }

    /// Forgets the chat. Returns whether it had any history.
    pub fn clear(&self, chat_id: &str) -> bool {
        self.chats.remove(chat_id).is_some()
    }

    /// Number of chats with a stored history.
    pub fn tracked_chats(&self) -> usize {
        self.chats.len()
    }
}
