// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the channel, strategy, and log adapters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform label stamped on every conversation context.
pub const PLATFORM_WHATSAPP: &str = "whatsapp";

/// Unique identifier for a message sent through a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

// --- Conversation types ---

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call snapshot of who is talking and how, passed alongside every AI call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub chat_id: String,
    pub contact_name: String,
    /// RFC 3339 timestamp of when the context was built.
    pub timestamp: String,
    pub platform: String,
    pub message_type: String,
    pub is_group: bool,
}

/// Outcome of one AI gateway invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiReply {
    pub text: String,
    pub success: bool,
    pub error: Option<String>,
}

impl AiReply {
    /// A successful reply carrying the generated text.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
            error: None,
        }
    }

    /// A failed reply carrying a user-safe fallback text and the error detail.
    pub fn failed(text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

// --- Channel types ---

/// A message received from the WhatsApp bridge, normalized for the relay.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Bridge-assigned message id.
    pub id: String,
    /// Chat identifier (JID), e.g. `5511999999999@s.whatsapp.net` or `...@g.us`.
    pub chat_id: String,
    /// Contact display name, falling back to the chat id.
    pub sender_name: String,
    pub text: String,
    /// Bridge message type label (`conversation`, `extendedTextMessage`, ...).
    pub message_type: String,
    pub is_group: bool,
    /// True when the message is an echo of something the bot itself sent.
    pub from_me: bool,
    /// RFC 3339 receive timestamp.
    pub timestamp: String,
}

/// A reply to be delivered through the channel.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub content: String,
    /// Id of the inbound message being answered, if any.
    pub reply_to: Option<String>,
}

/// Events surfaced by a channel adapter.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A chat message arrived.
    Message(InboundMessage),
    /// The bridge produced a pairing QR code that must be scanned.
    QrCode(String),
    /// The WhatsApp session is open.
    Connected,
    /// The WhatsApp session closed, with the bridge-reported reason.
    Disconnected(String),
}

// --- Log store types ---

/// Connection state of the bot as shown on the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BotStatus {
    Online,
    Offline,
    Connecting,
}

/// A row in the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub chat_id: String,
    pub contact_name: String,
    pub message_text: String,
    pub is_from_bot: bool,
    pub timestamp: String,
}

impl MessageRecord {
    /// Builds a record stamped with the current time.
    pub fn now(
        chat_id: impl Into<String>,
        contact_name: impl Into<String>,
        message_text: impl Into<String>,
        is_from_bot: bool,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            contact_name: contact_name.into(),
            message_text: message_text.into(),
            is_from_bot,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A row in the `bot_status` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: BotStatus,
    pub qr_code: Option<String>,
    pub updated_at: String,
}

impl StatusRecord {
    /// Builds a status record stamped with the current time.
    pub fn now(status: BotStatus, qr_code: Option<String>) -> Self {
        Self {
            status,
            qr_code,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
