// SPDX-FileCopyrightText: 2026 AgentKit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the AgentKit WhatsApp relay.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by the channel, reply strategy, and log store adapters.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AgentKitError;
pub use types::{
    AdapterType, AiReply, BotStatus, ChannelEvent, ChatMessage, ConversationContext,
    HealthStatus, InboundMessage, MessageId, MessageRecord, OutboundMessage, Role, StatusRecord,
};

pub use traits::{ChannelAdapter, MessageLog, PluginAdapter, ReplyStrategy};
